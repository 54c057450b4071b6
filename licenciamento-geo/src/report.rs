//! Rapport d'export avec dégradation gracieuse
//!
//! Collecte les fichiers écrits, les erreurs et les avertissements d'une
//! session d'export, puis les affiche ou les sauvegarde en JSON.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::download::SavedFile;

/// Statut global de l'export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportStatus {
    /// Tous les fichiers écrits
    Success,
    /// Certains fichiers écrits, d'autres en erreur
    PartialSuccess,
    /// Aucun fichier écrit
    Failed,
}

/// Erreur d'export avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct ExportError {
    /// Couche concernée (optionnel)
    pub layer: Option<String>,
    /// Format concerné (optionnel)
    pub format: Option<String>,
    pub message: String,
}

/// Avertissement (feature ignorée au chargement, ring refermé, ...)
#[derive(Debug, Clone, Serialize)]
pub struct ExportWarning {
    pub layer: String,
    pub message: String,
}

/// Statistiques par format
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormatStats {
    pub files: usize,
    pub bytes: usize,
    pub errors: usize,
}

/// Rapport complet d'une session d'export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Début de la session
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub status: ExportStatus,

    pub layers_processed: usize,
    pub features_exported: usize,

    /// Fichiers écrits
    pub files: Vec<PathBuf>,

    /// Statistiques par format (clé = extension)
    pub by_format: BTreeMap<String, FormatStats>,

    pub errors: Vec<ExportError>,
    pub warnings: Vec<ExportWarning>,
}

impl Default for ExportReport {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl ExportReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration_secs: 0.0,
            status: ExportStatus::Success,
            layers_processed: 0,
            features_exported: 0,
            files: Vec::new(),
            by_format: BTreeMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre une couche traitée
    pub fn record_layer(&mut self, feature_count: usize) {
        self.layers_processed += 1;
        self.features_exported += feature_count;
    }

    /// Enregistre un fichier écrit
    pub fn record_export(&mut self, format: &str, saved: &SavedFile) {
        let stats = self.by_format.entry(format.to_string()).or_default();
        stats.files += 1;
        stats.bytes += saved.bytes;
        self.files.push(saved.path.clone());
    }

    /// Enregistre une erreur
    pub fn record_error(&mut self, error: ExportError) {
        if let Some(ref format) = error.format {
            self.by_format.entry(format.clone()).or_default().errors += 1;
        }
        self.errors.push(error);
    }

    pub fn record_warning(&mut self, layer: &str, message: impl Into<String>) {
        self.warnings.push(ExportWarning {
            layer: layer.to_string(),
            message: message.into(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_errors = !self.errors.is_empty();
        let has_files = !self.files.is_empty();

        self.status = match (has_errors, has_files) {
            (false, _) => ExportStatus::Success,
            (true, true) => ExportStatus::PartialSuccess,
            (true, false) => ExportStatus::Failed,
        };
    }

    pub fn total_bytes(&self) -> usize {
        self.by_format.values().map(|s| s.bytes).sum()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("EXPORT REPORT - {}", self.started_at.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Layers: {} processed, {} features exported",
            self.layers_processed, self.features_exported
        );
        println!("Files: {} written, {} bytes", self.files.len(), self.total_bytes());

        if !self.by_format.is_empty() {
            println!("\n--- BY FORMAT ---");
            for (format, stats) in &self.by_format {
                println!(
                    "  {}: {} files, {} bytes, {} errors",
                    format, stats.files, stats.bytes, stats.errors
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.layer, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                let location = match (&e.layer, &e.format) {
                    (Some(l), Some(f)) => format!("[{}:{}]", l, f),
                    (Some(l), None) => format!("[{}]", l),
                    (None, Some(f)) => format!("[{}]", f),
                    _ => String::new(),
                };
                println!("  {} {}", location, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize export report")?;
        std::fs::write(path, json)
            .context(format!("Failed to write export report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {} layers, {} features, {} files, {} errors",
            self.status,
            self.layers_processed,
            self.features_exported,
            self.files.len(),
            self.errors.len()
        )
    }
}
