//! Configuration de l'application

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::selector::{BufferZoneSelector, DEFAULT_DISTANCE_M, DEFAULT_QUICK_PICKS};

/// Variables d'environnement lues au démarrage
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "BACKEND_ANON_KEY";

/// Configuration principale.
///
/// Les valeurs absentes valent une chaîne vide ; aucune validation au démarrage.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    /// URL de base de l'API REST
    pub api_base_url: String,

    /// URL du service backend
    pub backend_url: String,

    /// Clé anonyme du service backend
    #[serde(skip_serializing)]
    pub backend_anon_key: String,
}

impl Config {
    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lit la configuration depuis une source de variables arbitraire
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base_url: lookup(ENV_API_BASE_URL).unwrap_or_default(),
            backend_url: lookup(ENV_BACKEND_URL).unwrap_or_default(),
            backend_anon_key: lookup(ENV_BACKEND_ANON_KEY).unwrap_or_default(),
        }
    }

    /// Clé masquée pour l'affichage
    pub fn masked_key(&self) -> String {
        mask(&self.backend_anon_key)
    }

    /// Charge les valeurs par défaut du sélecteur depuis un fichier JSON
    pub fn load_buffer_defaults(path: &Path) -> Result<BufferDefaults> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read buffer defaults: {}", path.display()))?;

        let defaults: BufferDefaults =
            serde_json::from_str(&content).context("Failed to parse buffer defaults JSON")?;
        defaults.check()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("backend_url", &self.backend_url)
            .field("backend_anon_key", &self.masked_key())
            .finish()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}={}", ENV_API_BASE_URL, self.api_base_url)?;
        writeln!(f, "{}={}", ENV_BACKEND_URL, self.backend_url)?;
        write!(f, "{}={}", ENV_BACKEND_ANON_KEY, self.masked_key())
    }
}

fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => "(vazio)".to_string(),
        n if n <= 8 => "*".repeat(n),
        n => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{}…{}", head, tail)
        }
    }
}

/// Valeurs par défaut du sélecteur de zone
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BufferDefaults {
    /// Distance proposée à l'ouverture (mètres)
    #[serde(default = "default_distance")]
    pub default_distance_m: f64,

    /// Raccourcis de distance (mètres)
    #[serde(default = "default_quick_picks")]
    pub quick_picks: Vec<f64>,
}

fn default_distance() -> f64 {
    DEFAULT_DISTANCE_M
}

fn default_quick_picks() -> Vec<f64> {
    DEFAULT_QUICK_PICKS.to_vec()
}

impl Default for BufferDefaults {
    fn default() -> Self {
        Self {
            default_distance_m: default_distance(),
            quick_picks: default_quick_picks(),
        }
    }
}

impl BufferDefaults {
    /// Charge un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/buffer.json")),
            "app" => Self::load_embedded(include_str!("presets/app.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default, app", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let defaults: Self = serde_json::from_str(json).context("Failed to parse embedded preset")?;
        defaults.check()
    }

    fn check(self) -> Result<Self> {
        if let Some(bad) = std::iter::once(self.default_distance_m)
            .chain(self.quick_picks.iter().copied())
            .find(|d| !d.is_finite() || *d <= 0.0)
        {
            anyhow::bail!("Buffer distances must be positive, got {}", bad);
        }
        Ok(self)
    }

    /// Sélecteur initialisé avec ces valeurs
    pub fn selector(&self) -> BufferZoneSelector {
        BufferZoneSelector::new(self.default_distance_m, self.quick_picks.clone())
    }
}
