//! Export GeoJSON (FeatureCollection)

use ::geojson::feature::Id;
use ::geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::types::{FeatureGeometry, GeoFeature, GeoLayer, Position, Ring};
use crate::GeoError;

/// Construit la FeatureCollection d'une couche.
///
/// Les propriétés de la feature sont copiées puis `id` et `name` sont écrits
/// en dernier : ils l'emportent sur une propriété homonyme.
pub fn feature_collection(layer: &GeoLayer) -> FeatureCollection {
    build_collection(layer, false)
}

/// Comme [`feature_collection`], avec en plus la propriété `layerId`
/// (entrée attendue par les calculs de métriques et de buffer).
pub fn feature_collection_with_layer(layer: &GeoLayer) -> FeatureCollection {
    build_collection(layer, true)
}

/// Encode une couche en GeoJSON indenté
pub fn encode(layer: &GeoLayer) -> Result<String, GeoError> {
    encode_feature_collection(&feature_collection(layer))
}

/// Encode une FeatureCollection quelconque en GeoJSON indenté
pub fn encode_feature_collection(collection: &FeatureCollection) -> Result<String, GeoError> {
    Ok(serde_json::to_string_pretty(collection)?)
}

/// Convertit une géométrie de feature en géométrie GeoJSON (coordonnées à l'identique)
pub fn to_geojson_geometry(geometry: &FeatureGeometry) -> Geometry {
    let value = match geometry {
        FeatureGeometry::Point(position) => Value::Point(position_to_vec(position)),
        FeatureGeometry::Polygon(rings) => Value::Polygon(rings_to_vec(rings)),
        FeatureGeometry::MultiPolygon(polygons) => {
            Value::MultiPolygon(polygons.iter().map(|rings| rings_to_vec(rings)).collect())
        }
    };
    Geometry::new(value)
}

fn build_collection(layer: &GeoLayer, with_layer_id: bool) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: layer
            .features()
            .iter()
            .map(|feature| to_geojson_feature(feature, with_layer_id))
            .collect(),
        foreign_members: None,
    }
}

fn to_geojson_feature(feature: &GeoFeature, with_layer_id: bool) -> Feature {
    let mut properties = JsonObject::new();
    for (key, value) in &feature.properties {
        properties.insert(key.clone(), value.to_json());
    }
    properties.insert("id".to_string(), JsonValue::String(feature.id.clone()));
    properties.insert("name".to_string(), JsonValue::String(feature.name.clone()));
    if with_layer_id {
        properties.insert("layerId".to_string(), JsonValue::String(feature.layer_id.clone()));
    }

    Feature {
        bbox: None,
        geometry: Some(to_geojson_geometry(&feature.geometry)),
        id: Some(Id::String(feature.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn position_to_vec(position: &Position) -> Vec<f64> {
    position.to_vec()
}

fn rings_to_vec(rings: &[Ring]) -> Vec<Vec<Vec<f64>>> {
    rings
        .iter()
        .map(|ring| ring.iter().map(position_to_vec).collect())
        .collect()
}
