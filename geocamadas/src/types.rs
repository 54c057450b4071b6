//! Types de données pour le crate geocamadas

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

/// Position `[lng, lat]` (ordre GeoJSON)
pub type Position = [f64; 2];

/// Suite de positions d'un anneau (fermé si premier == dernier)
pub type Ring = Vec<Position>;

/// Propriétés d'une feature, triées par clé
pub type Properties = BTreeMap<String, PropertyValue>;

/// Type de géométrie supporté par les couches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Nom GeoJSON du type
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Géométrie d'une feature.
///
/// La profondeur d'imbrication est portée par le variant : un `Polygon` est une
/// liste d'anneaux (anneau 0 = contour extérieur, suivants = trous), un
/// `MultiPolygon` une liste de polygones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum FeatureGeometry {
    Point(Position),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl FeatureGeometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            FeatureGeometry::Point(_) => GeometryKind::Point,
            FeatureGeometry::Polygon(_) => GeometryKind::Polygon,
            FeatureGeometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    /// Itère sur tous les anneaux (vide pour un point)
    pub fn rings(&self) -> Box<dyn Iterator<Item = &Ring> + '_> {
        match self {
            FeatureGeometry::Point(_) => Box::new(std::iter::empty()),
            FeatureGeometry::Polygon(rings) => Box::new(rings.iter()),
            FeatureGeometry::MultiPolygon(polygons) => Box::new(polygons.iter().flatten()),
        }
    }

    /// Itère sur les anneaux en mutation
    pub fn rings_mut(&mut self) -> Box<dyn Iterator<Item = &mut Ring> + '_> {
        match self {
            FeatureGeometry::Point(_) => Box::new(std::iter::empty()),
            FeatureGeometry::Polygon(rings) => Box::new(rings.iter_mut()),
            FeatureGeometry::MultiPolygon(polygons) => Box::new(polygons.iter_mut().flatten()),
        }
    }

    /// Convertit vers une géométrie `geo` (x = lng, y = lat)
    pub fn to_geo(&self) -> Geometry<f64> {
        match self {
            FeatureGeometry::Point([lng, lat]) => Geometry::Point(Point::new(*lng, *lat)),
            FeatureGeometry::Polygon(rings) => Geometry::Polygon(polygon_to_geo(rings)),
            FeatureGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon::new(
                polygons.iter().map(|rings| polygon_to_geo(rings)).collect(),
            )),
        }
    }
}

fn ring_to_geo(ring: &Ring) -> LineString<f64> {
    LineString::new(ring.iter().map(|&[x, y]| Coord { x, y }).collect())
}

fn polygon_to_geo(rings: &[Ring]) -> Polygon<f64> {
    let mut iter = rings.iter();
    let exterior = iter.next().map(ring_to_geo).unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = iter.map(ring_to_geo).collect();
    Polygon::new(exterior, interiors)
}

/// Valeur scalaire d'une propriété
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// Convertit en valeur JSON (un nombre non fini devient `null`)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::Bool(b) => serde_json::Value::Bool(*b),
            PropertyValue::Number(n) => serde_json::Value::from(*n),
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }

    /// Convertit une valeur JSON arbitraire.
    ///
    /// `null` n'a pas de représentation ; tableaux et objets sont conservés
    /// sous forme de texte JSON compact.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(PropertyValue::Number),
            serde_json::Value::String(s) => Some(PropertyValue::String(s.clone())),
            other => Some(PropertyValue::String(other.to_string())),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Une feature géographique avec sa géométrie et ses attributs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFeature {
    /// Identifiant unique dans la couche
    pub id: String,

    /// Nom affiché
    pub name: String,

    pub geometry: FeatureGeometry,

    /// Attributs libres (clé -> valeur scalaire)
    #[serde(default)]
    pub properties: Properties,

    /// Identifiant de la couche propriétaire
    #[serde(default)]
    pub layer_id: String,
}

impl GeoFeature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, geometry: FeatureGeometry) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            geometry,
            properties: Properties::new(),
            layer_id: String::new(),
        }
    }

    /// Ajoute une propriété (builder)
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }
}

/// Origine d'une couche
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSource {
    #[default]
    System,
    Imported,
}

/// Couleur par défaut des couches (vert)
pub const DEFAULT_LAYER_COLOR: &str = "#16a34a";

/// Une couche géographique : collection ordonnée de features partageant un style
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLayer {
    pub id: String,
    pub name: String,
    features: Vec<GeoFeature>,
    pub visible: bool,
    color: String,
    opacity: f64,
    pub source: LayerSource,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl GeoLayer {
    /// Crée une couche visible, vide, avec le style par défaut
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            features: Vec::new(),
            visible: true,
            color: DEFAULT_LAYER_COLOR.to_string(),
            opacity: 1.0,
            source: LayerSource::System,
            uploaded_at: None,
        }
    }

    /// Définit couleur et opacité (builder)
    pub fn with_style(mut self, color: impl Into<String>, opacity: f64) -> Self {
        self.set_color(color);
        self.set_opacity(opacity);
        self
    }

    /// Marque la couche comme importée (builder)
    pub fn imported(mut self, uploaded_at: DateTime<Utc>) -> Self {
        self.source = LayerSource::Imported;
        self.uploaded_at = Some(uploaded_at);
        self
    }

    /// Ajoute une feature en réécrivant sa référence de couche.
    ///
    /// Un identifiant déjà présent dans la couche est suffixé `_2`, `_3`...
    pub fn add_feature(&mut self, mut feature: GeoFeature) {
        if self.feature(&feature.id).is_some() {
            let unique = self.unique_feature_id(&feature.id);
            warn!(layer = %self.id, from = %feature.id, to = %unique, "Duplicate feature id renamed");
            feature.id = unique;
        }
        feature.layer_id.clone_from(&self.id);
        self.features.push(feature);
    }

    fn unique_feature_id(&self, feature_id: &str) -> String {
        (2..)
            .map(|n| format!("{}_{}", feature_id, n))
            .find(|candidate| self.feature(candidate).is_none())
            .unwrap_or_else(|| feature_id.to_string())
    }

    pub fn extend_features(&mut self, features: impl IntoIterator<Item = GeoFeature>) {
        for feature in features {
            self.add_feature(feature);
        }
    }

    /// Retire une feature par identifiant
    pub fn remove_feature(&mut self, feature_id: &str) -> Option<GeoFeature> {
        let index = self.features.iter().position(|f| f.id == feature_id)?;
        Some(self.features.remove(index))
    }

    pub fn feature(&self, feature_id: &str) -> Option<&GeoFeature> {
        self.features.iter().find(|f| f.id == feature_id)
    }

    pub fn features(&self) -> &[GeoFeature] {
        &self.features
    }

    /// Nombre de features (toujours égal à la taille de la collection)
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Opacité bornée à [0, 1] ; une valeur non numérique rend la couche opaque
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Résumé utilisé par les listes de sélection
    pub fn summary(&self) -> LayerSummary {
        LayerSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            feature_count: self.feature_count(),
            visible: self.visible,
        }
    }
}

// `featureCount` est écrit à partir de la collection, jamais stocké
impl Serialize for GeoLayer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GeoLayer", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("features", &self.features)?;
        state.serialize_field("featureCount", &self.feature_count())?;
        state.serialize_field("visible", &self.visible)?;
        state.serialize_field("color", &self.color)?;
        state.serialize_field("opacity", &self.opacity)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("uploadedAt", &self.uploaded_at)?;
        state.end()
    }
}

/// Vue légère d'une couche (id, nom, nombre de features, visibilité)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub id: String,
    pub name: String,
    pub feature_count: usize,
    pub visible: bool,
}

impl LayerSummary {
    /// Libellé "Nom (N feature(s))"
    pub fn label(&self) -> String {
        let plural = if self.feature_count == 1 { "" } else { "s" };
        format!("{} ({} feature{})", self.name, self.feature_count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> FeatureGeometry {
        FeatureGeometry::Polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.0, 0.0],
        ]])
    }

    #[test]
    fn test_add_feature_sets_back_reference() {
        let mut layer = GeoLayer::new("app", "APP");
        layer.add_feature(GeoFeature::new("f1", "Área 1", square()));

        assert_eq!(layer.feature_count(), 1);
        assert_eq!(layer.features()[0].layer_id, "app");
    }

    #[test]
    fn test_duplicate_feature_ids_are_suffixed() {
        let mut layer = GeoLayer::new("app", "APP");
        layer.extend_features([
            GeoFeature::new("f1", "A", square()),
            GeoFeature::new("f1", "B", square()),
            GeoFeature::new("f1_2", "C", square()),
            GeoFeature::new("f1", "D", square()),
        ]);

        let ids: Vec<_> = layer.features().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["f1", "f1_2", "f1_2_2", "f1_3"]);
        assert_eq!(layer.feature("f1").unwrap().name, "A");
        assert_eq!(layer.remove_feature("f1").unwrap().name, "A");
        assert!(layer.feature("f1").is_none());
    }

    #[test]
    fn test_feature_count_follows_removal() {
        let mut layer = GeoLayer::new("app", "APP");
        layer.extend_features([
            GeoFeature::new("f1", "A", square()),
            GeoFeature::new("f2", "B", FeatureGeometry::Point([1.0, 2.0])),
        ]);
        assert_eq!(layer.feature_count(), 2);

        let removed = layer.remove_feature("f1").unwrap();
        assert_eq!(removed.id, "f1");
        assert_eq!(layer.feature_count(), 1);
        assert!(layer.remove_feature("absent").is_none());
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut layer = GeoLayer::new("l", "L");
        layer.set_opacity(1.7);
        assert_eq!(layer.opacity(), 1.0);
        layer.set_opacity(-0.2);
        assert_eq!(layer.opacity(), 0.0);
        layer.set_opacity(f64::NAN);
        assert_eq!(layer.opacity(), 1.0);
    }

    #[test]
    fn test_geometry_serializes_as_geojson_shape() {
        let json = serde_json::to_value(FeatureGeometry::Point([10.0, 20.0])).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Point", "coordinates": [10.0, 20.0]}));
    }

    #[test]
    fn test_property_value_from_json() {
        use serde_json::json;
        assert_eq!(PropertyValue::from_json(&json!(null)), None);
        assert_eq!(PropertyValue::from_json(&json!(2.5)), Some(PropertyValue::Number(2.5)));
        assert_eq!(
            PropertyValue::from_json(&json!([1, 2])),
            Some(PropertyValue::String("[1,2]".to_string()))
        );
    }

    #[test]
    fn test_layer_serializes_feature_count() {
        let mut layer = GeoLayer::new("l", "Rios");
        layer.add_feature(GeoFeature::new("f", "F", FeatureGeometry::Point([0.0, 0.0])));
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["featureCount"], 1);
        assert_eq!(json["source"], "system");

        let back: GeoLayer = serde_json::from_value(json).unwrap();
        assert_eq!(back, layer);
    }

    #[test]
    fn test_summary_label() {
        let mut layer = GeoLayer::new("l", "Rios");
        assert_eq!(layer.summary().label(), "Rios (0 features)");
        layer.add_feature(GeoFeature::new("f", "F", FeatureGeometry::Point([0.0, 0.0])));
        assert_eq!(layer.summary().label(), "Rios (1 feature)");
    }

    #[test]
    fn test_to_geo_keeps_holes() {
        let geometry = FeatureGeometry::Polygon(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
        ]);
        match geometry.to_geo() {
            Geometry::Polygon(p) => assert_eq!(p.interiors().len(), 1),
            other => panic!("unexpected geometry: {:?}", other),
        }
    }
}
