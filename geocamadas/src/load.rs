//! Chargement de couches depuis des documents GeoJSON

use std::path::Path;

use ::geojson::feature::Id;
use ::geojson::{Feature, GeoJson, Value};
use chrono::Utc;
use tracing::{debug, warn};

use crate::types::{FeatureGeometry, GeoFeature, GeoLayer, Position, PropertyValue, Ring};
use crate::GeoError;

/// Résultat du chargement d'un document
#[derive(Debug)]
pub struct LoadResult {
    /// Couche importée (features supportées uniquement)
    pub layer: GeoLayer,

    /// Erreurs non fatales (features ignorées)
    pub errors: Vec<GeoError>,
}

/// Charge un fichier GeoJSON ; id et nom de couche dérivés du nom de fichier
pub fn load_file(path: &Path) -> Result<LoadResult, GeoError> {
    let text = std::fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("camada");
    let layer_id = crate::codec::sanitize_filename(stem);
    load_str(&text, &layer_id, stem)
}

/// Charge un document GeoJSON (FeatureCollection, Feature ou Geometry seule).
///
/// Seuls Point, Polygon et MultiPolygon sont retenus ; les autres features
/// sont ignorées et signalées dans `errors`. Les identifiants répétés (ou en
/// collision avec un identifiant généré) sont suffixés `_2`, `_3`...
pub fn load_str(text: &str, layer_id: &str, layer_name: &str) -> Result<LoadResult, GeoError> {
    let document: GeoJson = text.parse()?;
    let features = match document {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut layer = GeoLayer::new(layer_id, layer_name).imported(Utc::now());
    let mut errors = Vec::new();

    for (index, feature) in features.iter().enumerate() {
        match convert_feature(feature, layer_id, index) {
            Ok(converted) => layer.add_feature(converted),
            Err(e) => {
                warn!(layer = layer_id, index, error = %e, "Skipping feature");
                errors.push(e);
            }
        }
    }

    debug!(
        layer = layer_id,
        features = layer.feature_count(),
        skipped = errors.len(),
        "GeoJSON loaded"
    );

    Ok(LoadResult { layer, errors })
}

fn convert_feature(feature: &Feature, layer_id: &str, index: usize) -> Result<GeoFeature, GeoError> {
    let id = feature_id(feature).unwrap_or_else(|| format!("{}_{}", layer_id, index));

    let Some(geometry) = &feature.geometry else {
        return Err(GeoError::invalid_geometry(&id, "missing geometry"));
    };

    let geometry = match &geometry.value {
        Value::Point(position) => FeatureGeometry::Point(to_position(position, &id)?),
        Value::Polygon(rings) => FeatureGeometry::Polygon(to_rings(rings, &id)?),
        Value::MultiPolygon(polygons) => FeatureGeometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| to_rings(rings, &id))
                .collect::<Result<_, _>>()?,
        ),
        other => return Err(GeoError::unsupported_geometry(&id, value_type_name(other))),
    };

    let mut properties = crate::types::Properties::new();
    if let Some(props) = &feature.properties {
        for (key, value) in props {
            if let Some(value) = PropertyValue::from_json(value) {
                properties.insert(key.clone(), value);
            }
        }
    }

    let name = ["name", "nome"]
        .iter()
        .find_map(|key| match properties.get(*key) {
            Some(PropertyValue::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_else(|| id.clone());

    Ok(GeoFeature {
        id,
        name,
        geometry,
        properties,
        layer_id: layer_id.to_string(),
    })
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Identifiant : membre `id` de la feature, sinon propriété `id`
fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(Id::String(s)) => return Some(s.clone()),
        Some(Id::Number(n)) => return Some(n.to_string()),
        None => {}
    }
    match feature.property("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn to_position(position: &[f64], feature_id: &str) -> Result<Position, GeoError> {
    match position {
        [lng, lat, ..] => Ok([*lng, *lat]),
        _ => Err(GeoError::invalid_geometry(
            feature_id,
            format!("position with {} component(s)", position.len()),
        )),
    }
}

fn to_rings(rings: &[Vec<Vec<f64>>], feature_id: &str) -> Result<Vec<Ring>, GeoError> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|position| to_position(position, feature_id))
                .collect()
        })
        .collect()
}
