//! Validation et fermeture des anneaux de polygones
//!
//! La construction d'une feature n'impose pas la fermeture des anneaux ;
//! ces fonctions permettent de la vérifier ou de la corriger explicitement.

use tracing::warn;

use crate::types::{FeatureGeometry, GeoFeature, Position};
use crate::GeoError;

/// Nombre minimal de positions d'un anneau fermé (triangle + retour au départ)
pub const MIN_RING_POSITIONS: usize = 4;

/// Vérifie qu'une feature est exploitable : positions numériques, anneaux fermés
pub fn validate_feature(feature: &GeoFeature) -> Result<(), GeoError> {
    if let FeatureGeometry::Point(position) = &feature.geometry {
        if !is_finite(position) {
            return Err(GeoError::invalid_geometry(&feature.id, "non-numeric coordinate"));
        }
        return Ok(());
    }

    let mut ring_count = 0;
    for (index, ring) in feature.geometry.rings().enumerate() {
        ring_count += 1;
        if ring.len() < MIN_RING_POSITIONS {
            return Err(GeoError::invalid_geometry(
                &feature.id,
                format!("ring {} has {} positions (min {})", index, ring.len(), MIN_RING_POSITIONS),
            ));
        }
        if let Some(bad) = ring.iter().position(|p| !is_finite(p)) {
            return Err(GeoError::invalid_geometry(
                &feature.id,
                format!("ring {} has a non-numeric coordinate at position {}", index, bad),
            ));
        }
        if !is_closed(ring) {
            return Err(GeoError::invalid_geometry(
                &feature.id,
                format!("ring {} is not closed", index),
            ));
        }
    }

    if ring_count == 0 {
        return Err(GeoError::invalid_geometry(&feature.id, "polygon without rings"));
    }

    Ok(())
}

/// Ferme les anneaux ouverts en répétant leur première position.
///
/// Retourne le nombre d'anneaux corrigés.
pub fn close_rings(feature: &mut GeoFeature) -> usize {
    let feature_id = feature.id.clone();
    let mut closed = 0;

    for ring in feature.geometry.rings_mut() {
        if ring.len() > 1 && !is_closed(ring) {
            let first = ring[0];
            let last = ring[ring.len() - 1];
            let gap = ((first[0] - last[0]).powi(2) + (first[1] - last[1]).powi(2)).sqrt();
            warn!(
                feature = %feature_id,
                points = ring.len(),
                gap_degrees = gap,
                "Auto-closing unclosed ring"
            );
            ring.push(first);
            closed += 1;
        }
    }

    closed
}

fn is_closed(ring: &[Position]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => positions_equal(*first, *last),
        _ => false,
    }
}

fn is_finite(position: &Position) -> bool {
    position[0].is_finite() && position[1].is_finite()
}

/// Compare deux positions avec tolérance
fn positions_equal(a: Position, b: Position) -> bool {
    const TOLERANCE: f64 = 1e-9;
    (a[0] - b[0]).abs() < TOLERANCE && (a[1] - b[1]).abs() < TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(ring: Vec<Position>) -> GeoFeature {
        GeoFeature::new("p1", "P", FeatureGeometry::Polygon(vec![ring]))
    }

    #[test]
    fn test_valid_polygon() {
        let feature = polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        assert!(validate_feature(&feature).is_ok());
    }

    #[test]
    fn test_open_ring_is_rejected_then_closed() {
        let mut feature = polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert!(validate_feature(&feature).is_err());

        assert_eq!(close_rings(&mut feature), 1);
        assert!(validate_feature(&feature).is_ok());
        assert_eq!(close_rings(&mut feature), 0);
    }

    #[test]
    fn test_short_ring() {
        let feature = polygon(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]);
        let err = validate_feature(&feature).unwrap_err();
        assert!(err.to_string().contains("min 4"));
    }

    #[test]
    fn test_non_numeric_point() {
        let feature = GeoFeature::new("pt", "Pt", FeatureGeometry::Point([f64::NAN, 1.0]));
        assert!(validate_feature(&feature).is_err());
    }

    #[test]
    fn test_multipolygon_hole_checked() {
        let outer = vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 0.0]];
        let open_hole = vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.5, 1.5]];
        let mut feature = GeoFeature::new(
            "mp",
            "MP",
            FeatureGeometry::MultiPolygon(vec![vec![outer, open_hole]]),
        );
        assert!(validate_feature(&feature).is_err());
        assert_eq!(close_rings(&mut feature), 1);
        assert!(validate_feature(&feature).is_ok());
    }
}
