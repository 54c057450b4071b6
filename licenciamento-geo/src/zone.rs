//! Orchestration du calcul de zone d'amortecimento
//!
//! Le calcul géométrique (buffer puis soustraction de la couche de référence)
//! appartient à une bibliothèque externe, atteinte via [`ZoneCalculator`].
//! Ce module relie la demande confirmée, le rapporteur de progression et le
//! jeu de couches.

use geocamadas::{GeoError, GeoFeature, GeoLayer, LayerSet, LayerSource};
use thiserror::Error;
use tracing::{info, warn};

use crate::progress::ProgressReporter;
use crate::selector::BufferZoneRequest;

/// Couleur des couches dérivées
pub const ZONE_LAYER_COLOR: &str = "#f59e0b";

/// Opacité des couches dérivées
pub const ZONE_LAYER_OPACITY: f64 = 0.5;

/// Erreurs du calcul de zone
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("Camada não encontrada: {0}")]
    LayerNotFound(String),

    #[error("Camada inválida: sem features ({0})")]
    EmptyLayer(String),

    /// Échec rapporté par le moteur géométrique
    #[error("Erro no cálculo: {0}")]
    Calculation(String),

    #[error(transparent)]
    Geo(#[from] GeoError),
}

/// Moteur géométrique externe
pub trait ZoneCalculator {
    /// Calcule la zone : buffer de `distance_m` autour de `base`, moins `reference`.
    ///
    /// `progress(étape, pourcentage)` peut être appelé autant de fois que voulu.
    fn calculate(
        &self,
        base: &GeoLayer,
        reference: &GeoLayer,
        distance_m: f64,
        progress: &mut dyn FnMut(&str, u8),
    ) -> Result<Vec<GeoFeature>, ZoneError>;
}

/// Exécute une demande confirmée et ajoute la couche résultante.
///
/// Une seule tentative, sans annulation ni délai. Retourne l'identifiant de
/// la nouvelle couche.
pub fn run_buffer_zone(
    request: &BufferZoneRequest,
    layers: &mut LayerSet,
    calculator: &dyn ZoneCalculator,
    reporter: &mut ProgressReporter,
) -> Result<String, ZoneError> {
    reporter.running("Preparando camadas", 0);

    let added = compute(request, layers, calculator, reporter).and_then(|layer| {
        let layer_id = layer.id.clone();
        let features = layer.feature_count();
        layers.add(layer)?;
        Ok((layer_id, features))
    });

    match added {
        Ok((layer_id, features)) => {
            reporter.succeed();
            info!(
                layer = %layer_id,
                features,
                distance_m = request.distance_m,
                "Buffer zone layer added"
            );
            Ok(layer_id)
        }
        Err(e) => {
            warn!(
                base = %request.base_layer_id,
                reference = %request.reference_layer_id,
                error = %e,
                "Buffer zone calculation failed"
            );
            reporter.fail(e.to_string());
            Err(e)
        }
    }
}

fn compute(
    request: &BufferZoneRequest,
    layers: &LayerSet,
    calculator: &dyn ZoneCalculator,
    reporter: &mut ProgressReporter,
) -> Result<GeoLayer, ZoneError> {
    let base = layers
        .get(&request.base_layer_id)
        .ok_or_else(|| ZoneError::LayerNotFound(request.base_layer_id.clone()))?;
    let reference = layers
        .get(&request.reference_layer_id)
        .ok_or_else(|| ZoneError::LayerNotFound(request.reference_layer_id.clone()))?;

    if base.feature_count() == 0 {
        return Err(ZoneError::EmptyLayer(base.id.clone()));
    }

    let features = calculator.calculate(base, reference, request.distance_m, &mut |step, percent| {
        reporter.running(step, percent);
    })?;

    let mut layer = GeoLayer::new(
        derived_layer_id(layers, &base.id, request.distance_m),
        format!(
            "Zona de Amortecimento - {} ({} m)",
            base.name,
            format_distance(request.distance_m)
        ),
    )
    .with_style(ZONE_LAYER_COLOR, ZONE_LAYER_OPACITY);
    layer.source = LayerSource::System;
    layer.extend_features(features);
    Ok(layer)
}

/// `buffer_<base>_<distance>m`, suffixé `_2`, `_3`... si déjà pris
fn derived_layer_id(layers: &LayerSet, base_id: &str, distance_m: f64) -> String {
    let stem = format!("buffer_{}_{}m", base_id, format_distance(distance_m));
    if !layers.contains(&stem) {
        return stem;
    }
    (2..)
        .map(|n| format!("{}_{}", stem, n))
        .find(|candidate| !layers.contains(candidate))
        .unwrap_or(stem)
}

fn format_distance(distance_m: f64) -> String {
    if distance_m.fract() == 0.0 {
        format!("{:.0}", distance_m)
    } else {
        format!("{}", distance_m)
    }
}
