//! Sélection des couches pour le calcul de zone d'amortecimento
//!
//! Le sélecteur ne calcule rien : il valide le choix (couche base, couche de
//! référence, distance) et transmet la demande confirmée à l'appelant.

use geocamadas::{LayerSet, LayerSummary};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Distance par défaut (mètres)
pub const DEFAULT_DISTANCE_M: f64 = 100.0;

/// Raccourcis de distance proposés (mètres)
pub const DEFAULT_QUICK_PICKS: [f64; 4] = [50.0, 100.0, 500.0, 1000.0];

/// Nombre minimal de couches visibles pour autoriser un calcul
pub const MIN_VISIBLE_LAYERS: usize = 2;

/// Échec de validation de la sélection (messages affichés à l'utilisateur)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("É necessário ter pelo menos 2 camadas visíveis para calcular a zona de amortecimento")]
    InsufficientLayers,

    #[error("Por favor, selecione a camada base")]
    MissingBase,

    #[error("Por favor, selecione a camada de referência")]
    MissingReference,

    #[error("As camadas base e de referência devem ser diferentes")]
    SameLayer,

    #[error("A distância deve ser maior que zero")]
    InvalidDistance(f64),

    #[error("Camada não disponível para seleção: {0}")]
    LayerNotVisible(String),
}

/// Canal de notification (toast) vers l'utilisateur
pub trait Notifier {
    fn warn(&mut self, message: &str);
}

/// Notifications routées vers les logs
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&mut self, message: &str) {
        warn!(target: "licenciamento_geo::notify", "{}", message);
    }
}

/// Demande de calcul confirmée
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferZoneRequest {
    pub base_layer_id: String,
    pub reference_layer_id: String,
    pub distance_m: f64,
}

impl BufferZoneRequest {
    /// Construit une demande ; base ≠ référence et distance finie > 0
    pub fn new(
        base_layer_id: impl Into<String>,
        reference_layer_id: impl Into<String>,
        distance_m: f64,
    ) -> Result<Self, SelectionError> {
        let base_layer_id = base_layer_id.into();
        let reference_layer_id = reference_layer_id.into();
        if base_layer_id == reference_layer_id {
            return Err(SelectionError::SameLayer);
        }
        if !distance_m.is_finite() || distance_m <= 0.0 {
            return Err(SelectionError::InvalidDistance(distance_m));
        }
        Ok(Self {
            base_layer_id,
            reference_layer_id,
            distance_m,
        })
    }
}

/// État du dialogue de sélection
#[derive(Debug, Clone)]
pub struct BufferZoneSelector {
    layers: Vec<LayerSummary>,
    base: Option<String>,
    reference: Option<String>,
    distance_m: f64,
    default_distance_m: f64,
    quick_picks: Vec<f64>,
}

impl Default for BufferZoneSelector {
    fn default() -> Self {
        Self::new(DEFAULT_DISTANCE_M, DEFAULT_QUICK_PICKS.to_vec())
    }
}

impl BufferZoneSelector {
    pub fn new(default_distance_m: f64, quick_picks: Vec<f64>) -> Self {
        Self {
            layers: Vec::new(),
            base: None,
            reference: None,
            distance_m: default_distance_m,
            default_distance_m,
            quick_picks,
        }
    }

    /// Ouvre le dialogue sur l'état courant des couches.
    ///
    /// Pré-sélectionne la première couche visible comme base et la seconde
    /// comme référence ; la distance revient à sa valeur par défaut.
    pub fn open(&mut self, layers: &LayerSet) {
        self.layers = layers.summaries();
        self.distance_m = self.default_distance_m;
        let mut visible = self.layers.iter().filter(|l| l.visible).map(|l| l.id.clone());
        self.base = visible.next();
        self.reference = visible.next();
        debug!(
            layers = self.layers.len(),
            base = ?self.base,
            reference = ?self.reference,
            "Buffer zone selector opened"
        );
    }

    /// Couches proposées (visibles uniquement)
    pub fn visible_layers(&self) -> impl Iterator<Item = &LayerSummary> {
        self.layers.iter().filter(|l| l.visible)
    }

    /// Couches proposées comme référence : visibles, hors couche base
    pub fn reference_options(&self) -> impl Iterator<Item = &LayerSummary> {
        let base = self.base.clone();
        self.visible_layers()
            .filter(move |l| Some(&l.id) != base.as_ref())
    }

    pub fn quick_picks(&self) -> &[f64] {
        &self.quick_picks
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// Choisit la couche base (`None` efface la sélection)
    pub fn select_base(&mut self, layer_id: Option<&str>) -> Result<(), SelectionError> {
        self.base = self.checked_selection(layer_id)?;
        Ok(())
    }

    /// Choisit la couche de référence (`None` efface la sélection)
    pub fn select_reference(&mut self, layer_id: Option<&str>) -> Result<(), SelectionError> {
        self.reference = self.checked_selection(layer_id)?;
        Ok(())
    }

    pub fn set_distance(&mut self, distance_m: f64) {
        self.distance_m = distance_m;
    }

    /// Applique un raccourci de distance ; retourne la distance retenue
    pub fn apply_quick_pick(&mut self, index: usize) -> Option<f64> {
        let distance = *self.quick_picks.get(index)?;
        self.distance_m = distance;
        Some(distance)
    }

    /// Moins de deux couches visibles : état vide bloquant
    pub fn is_blocked(&self) -> bool {
        self.visible_layers().count() < MIN_VISIBLE_LAYERS
    }

    /// Bouton de confirmation actif
    pub fn can_confirm(&self) -> bool {
        !self.is_blocked() && self.base.is_some() && self.reference.is_some()
    }

    /// Valide dans un ordre fixe : base, référence, base ≠ référence, distance > 0
    pub fn validate(&self) -> Result<BufferZoneRequest, SelectionError> {
        let base = self.base.as_deref().ok_or(SelectionError::MissingBase)?;
        let reference = self
            .reference
            .as_deref()
            .ok_or(SelectionError::MissingReference)?;
        BufferZoneRequest::new(base, reference, self.distance_m)
    }

    /// Confirme la sélection.
    ///
    /// Bloqué : rien n'est émis. Sinon la première règle violée produit un seul
    /// avertissement ; en cas de succès `on_confirm(base, référence, distance)`
    /// est appelé une fois.
    pub fn confirm<F>(
        &self,
        notifier: &mut dyn Notifier,
        on_confirm: F,
    ) -> Result<BufferZoneRequest, SelectionError>
    where
        F: FnOnce(&str, &str, f64),
    {
        if self.is_blocked() {
            return Err(SelectionError::InsufficientLayers);
        }

        match self.validate() {
            Ok(request) => {
                debug!(
                    base = %request.base_layer_id,
                    reference = %request.reference_layer_id,
                    distance_m = request.distance_m,
                    "Buffer zone confirmed"
                );
                on_confirm(
                    &request.base_layer_id,
                    &request.reference_layer_id,
                    request.distance_m,
                );
                Ok(request)
            }
            Err(e) => {
                notifier.warn(&e.to_string());
                Err(e)
            }
        }
    }

    fn checked_selection(&self, layer_id: Option<&str>) -> Result<Option<String>, SelectionError> {
        match layer_id {
            None => Ok(None),
            Some(id) if self.visible_layers().any(|l| l.id == id) => Ok(Some(id.to_string())),
            Some(id) => Err(SelectionError::LayerNotVisible(id.to_string())),
        }
    }
}
