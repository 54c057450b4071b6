//! Export CSV : une ligne par feature, géométrie embarquée en JSON

use crate::types::{FeatureGeometry, GeoFeature, GeoLayer};

/// En-tête des colonnes
pub const HEADER: &str = "id,name,type,geometry";

/// Encode une couche en CSV (`id,name,type,geometry`).
///
/// La colonne `geometry` contient la structure de coordonnées complète en JSON,
/// entre guillemets ; le consommateur doit la re-parser.
pub fn encode(layer: &GeoLayer) -> String {
    let mut lines = Vec::with_capacity(layer.feature_count() + 1);
    lines.push(HEADER.to_string());
    lines.extend(layer.features().iter().map(encode_row));
    lines.join("\n")
}

fn encode_row(feature: &GeoFeature) -> String {
    [
        escape_field(&feature.id),
        quote(&feature.name),
        feature.kind().to_string(),
        quote(&coordinates_json(&feature.geometry)),
    ]
    .join(",")
}

/// Coordonnées seules, en JSON compact
fn coordinates_json(geometry: &FeatureGeometry) -> String {
    let value = match geometry {
        FeatureGeometry::Point(position) => serde_json::json!(position),
        FeatureGeometry::Polygon(rings) => serde_json::json!(rings),
        FeatureGeometry::MultiPolygon(polygons) => serde_json::json!(polygons),
    };
    value.to_string()
}

/// Champ toujours entre guillemets, guillemets internes doublés
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Champ brut, cité seulement s'il contient un séparateur
fn escape_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        quote(s)
    } else {
        s.to_string()
    }
}
