//! Métriques de surface et de périmètre d'une couche (géodésiques, WGS84)

use geo::{GeodesicArea, Geometry};
use serde::Serialize;

use crate::types::{GeoFeature, GeoLayer};

const M2_PER_HECTARE: f64 = 10_000.0;

/// Métriques d'une feature
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureMetrics {
    pub id: String,
    pub name: String,
    pub area_m2: f64,
    pub area_ha: f64,
    pub perimeter_km: f64,
}

/// Métriques agrégées d'une couche
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerMetrics {
    pub features: Vec<FeatureMetrics>,
    pub total_area_m2: f64,
    pub total_area_ha: f64,
    pub total_perimeter_km: f64,
}

impl LayerMetrics {
    /// Part de la feature `index` dans la surface totale, en pourcentage
    pub fn share_of_total(&self, index: usize) -> Option<f64> {
        let feature = self.features.get(index)?;
        if self.total_area_ha > 0.0 {
            Some(feature.area_ha / self.total_area_ha * 100.0)
        } else {
            Some(0.0)
        }
    }

    /// Surface moyenne par feature (ha)
    pub fn mean_area_ha(&self) -> f64 {
        if self.features.is_empty() {
            0.0
        } else {
            self.total_area_ha / self.features.len() as f64
        }
    }
}

/// Calcule surface et périmètre d'une feature ; un point vaut zéro
pub fn feature_metrics(feature: &GeoFeature) -> FeatureMetrics {
    let (area_m2, perimeter_m) = match feature.geometry.to_geo() {
        Geometry::Polygon(polygon) => (
            polygon.geodesic_area_unsigned(),
            polygon.geodesic_perimeter(),
        ),
        Geometry::MultiPolygon(multi) => {
            (multi.geodesic_area_unsigned(), multi.geodesic_perimeter())
        }
        _ => (0.0, 0.0),
    };

    FeatureMetrics {
        id: feature.id.clone(),
        name: feature.name.clone(),
        area_m2,
        area_ha: area_m2 / M2_PER_HECTARE,
        perimeter_km: perimeter_m / 1000.0,
    }
}

/// Calcule les métriques de toutes les features d'une couche
pub fn layer_metrics(layer: &GeoLayer) -> LayerMetrics {
    let features: Vec<FeatureMetrics> = layer.features().iter().map(feature_metrics).collect();
    let total_area_m2 = features.iter().map(|f| f.area_m2).sum();
    let total_perimeter_km = features.iter().map(|f| f.perimeter_km).sum();

    LayerMetrics {
        features,
        total_area_m2,
        total_area_ha: total_area_m2 / M2_PER_HECTARE,
        total_perimeter_km,
    }
}
