//! Emprise (bounding box) des couches en latitude/longitude

use serde::{Deserialize, Serialize};

use crate::types::{FeatureGeometry, GeoLayer, Position};

/// Point en latitude/longitude (degrés)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Depuis une position GeoJSON `[lng, lat]` ; `None` si une composante n'est pas numérique
    pub fn from_position(position: &Position) -> Option<Self> {
        let [lng, lat] = *position;
        if lat.is_finite() && lng.is_finite() {
            Some(Self { lat, lng })
        } else {
            None
        }
    }
}

/// Emprise minimale englobant un ensemble de points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Emprise réduite à un point
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Emprise minimale ; `None` pour une liste vide
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Self::from_point(*first);
        for point in rest {
            bounds.extend(*point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
        }
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }
}

/// Toutes les positions numériques d'une couche, en lat/lng.
///
/// Point : la position ; Polygon : contour extérieur et trous ; MultiPolygon :
/// le contour extérieur de chaque polygone. Les paires non numériques sont ignorées.
pub fn collect_lat_lngs(layer: &GeoLayer) -> Vec<LatLng> {
    let mut points = Vec::new();

    for feature in layer.features() {
        match &feature.geometry {
            FeatureGeometry::Point(position) => {
                points.extend(LatLng::from_position(position));
            }
            FeatureGeometry::Polygon(rings) => {
                for ring in rings {
                    points.extend(ring.iter().filter_map(LatLng::from_position));
                }
            }
            FeatureGeometry::MultiPolygon(polygons) => {
                for outer in polygons.iter().filter_map(|rings| rings.first()) {
                    points.extend(outer.iter().filter_map(LatLng::from_position));
                }
            }
        }
    }

    points
}

/// Emprise d'une couche ; `None` si aucune coordonnée valide
pub fn layer_bounds(layer: &GeoLayer) -> Option<LatLngBounds> {
    LatLngBounds::from_points(&collect_lat_lngs(layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoFeature;

    #[test]
    fn test_point_and_polygon_bounds() {
        let mut layer = GeoLayer::new("l", "L");
        layer.add_feature(GeoFeature::new("pt", "Pt", FeatureGeometry::Point([10.0, 20.0])));
        layer.add_feature(GeoFeature::new(
            "pg",
            "Pg",
            FeatureGeometry::Polygon(vec![vec![[0.0, 0.0], [30.0, 0.0], [30.0, 40.0], [0.0, 0.0]]]),
        ));

        let bounds = layer_bounds(&layer).unwrap();
        assert!(bounds.south() <= 0.0 && bounds.west() <= 0.0);
        assert!(bounds.north() >= 40.0 && bounds.east() >= 30.0);
        assert!(bounds.contains(LatLng::new(20.0, 10.0)));
    }

    #[test]
    fn test_non_numeric_pairs_are_skipped() {
        let mut layer = GeoLayer::new("l", "L");
        layer.add_feature(GeoFeature::new("a", "A", FeatureGeometry::Point([f64::NAN, 5.0])));
        layer.add_feature(GeoFeature::new("b", "B", FeatureGeometry::Point([1.0, 2.0])));

        let points = collect_lat_lngs(&layer);
        assert_eq!(points, vec![LatLng::new(2.0, 1.0)]);
    }

    #[test]
    fn test_multipolygon_uses_outer_rings_only() {
        let mut layer = GeoLayer::new("l", "L");
        layer.add_feature(GeoFeature::new(
            "mp",
            "MP",
            FeatureGeometry::MultiPolygon(vec![vec![
                vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]],
                vec![[50.0, 50.0], [51.0, 50.0], [51.0, 51.0], [50.0, 50.0]],
            ]]),
        ));

        let bounds = layer_bounds(&layer).unwrap();
        assert_eq!(bounds.north_east, LatLng::new(2.0, 2.0));
    }

    #[test]
    fn test_polygon_holes_are_included() {
        let mut layer = GeoLayer::new("l", "L");
        layer.add_feature(GeoFeature::new(
            "pg",
            "Pg",
            FeatureGeometry::Polygon(vec![
                vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
                vec![[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]],
            ]),
        ));
        assert_eq!(collect_lat_lngs(&layer).len(), 8);
    }

    #[test]
    fn test_empty_layer_has_no_bounds() {
        assert!(layer_bounds(&GeoLayer::new("l", "L")).is_none());
    }
}
