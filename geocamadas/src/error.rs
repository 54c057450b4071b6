//! Types d'erreurs pour le crate geocamadas

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement, de la validation ou de l'export des couches
#[derive(Debug, Error)]
pub enum GeoError {
    /// Erreur d'I/O lors de la lecture d'un fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document GeoJSON illisible
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Erreur de sérialisation JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Type de géométrie non supporté (LineString, GeometryCollection, ...)
    #[error("Unsupported geometry type for {feature_id}: {kind}")]
    UnsupportedGeometry { feature_id: String, kind: String },

    /// Géométrie invalide (ring ouvert, coordonnée non numérique, ...)
    #[error("Invalid geometry for {feature_id}: {reason}")]
    InvalidGeometry { feature_id: String, reason: String },

    /// Identifiant de couche déjà présent dans le jeu de couches
    #[error("Duplicate layer id: {0}")]
    DuplicateLayer(String),
}

impl GeoError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(feature_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            feature_id: feature_id.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de géométrie non supportée
    pub fn unsupported_geometry(feature_id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedGeometry {
            feature_id: feature_id.into(),
            kind: kind.into(),
        }
    }
}
