//! Tests d'intégration : sélection → calcul → cadrage → export

use geocamadas::bounds::layer_bounds;
use geocamadas::load::{load_file, load_str};
use geocamadas::{ExportFormat, FeatureGeometry, GeoFeature, GeoLayer, LayerSet};
use licenciamento_geo::download::save_layer;
use licenciamento_geo::map::{MapAdapter, MapState, Viewport, ZoomOutcome};
use licenciamento_geo::{
    run_buffer_zone, BufferZoneSelector, Notifier, ProgressReporter, ProgressState,
    SelectionError, ZoneCalculator, ZoneError,
};

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Moteur simplifié : carré englobant chaque feature, élargi de la distance
struct EnvelopeCalculator;

impl ZoneCalculator for EnvelopeCalculator {
    fn calculate(
        &self,
        base: &GeoLayer,
        _reference: &GeoLayer,
        distance_m: f64,
        progress: &mut dyn FnMut(&str, u8),
    ) -> Result<Vec<GeoFeature>, ZoneError> {
        let pad = distance_m / METERS_PER_DEGREE;
        let total = base.feature_count();
        let mut zones = Vec::with_capacity(total);

        for (index, feature) in base.features().iter().enumerate() {
            let points: Vec<[f64; 2]> = match &feature.geometry {
                FeatureGeometry::Point(p) => vec![*p],
                geometry => geometry.rings().flatten().copied().collect(),
            };
            let (mut w, mut s, mut e, mut n) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
            for [lng, lat] in points {
                w = w.min(lng);
                s = s.min(lat);
                e = e.max(lng);
                n = n.max(lat);
            }
            let (w, s, e, n) = (w - pad, s - pad, e + pad, n + pad);
            zones.push(GeoFeature::new(
                format!("{}_zona", feature.id),
                format!("Zona {}", feature.name),
                FeatureGeometry::Polygon(vec![vec![[w, s], [e, s], [e, n], [w, n], [w, s]]]),
            ));
            progress("Gerando buffer", ((index + 1) * 100 / total) as u8);
        }
        Ok(zones)
    }
}

#[derive(Default)]
struct RecordingNotifier {
    warnings: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

fn load_layers() -> LayerSet {
    let nascentes = load_str(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"n1","properties":{"nome":"Nascente 1"},
             "geometry":{"type":"Point","coordinates":[-63.90,-8.70]}},
            {"type":"Feature","id":"n2","properties":{"nome":"Nascente 2"},
             "geometry":{"type":"Point","coordinates":[-63.85,-8.75]}}
        ]}"#,
        "nascentes",
        "Nascentes",
    )
    .unwrap();
    let uso = load_str(
        r#"{"type":"Feature","id":"u1","properties":{"nome":"Pastagem"},
            "geometry":{"type":"Polygon","coordinates":[[[-64,-9],[-63,-9],[-63,-8],[-64,-9]]]}}"#,
        "uso",
        "Uso do Solo",
    )
    .unwrap();

    let mut layers = LayerSet::new();
    layers.add(nascentes.layer).unwrap();
    layers.add(uso.layer).unwrap();
    layers
}

#[test]
fn test_full_buffer_workflow() {
    let mut layers = load_layers();

    let mut selector = BufferZoneSelector::default();
    selector.open(&layers);
    selector.apply_quick_pick(2);

    let mut notifier = RecordingNotifier::default();
    let mut calls = Vec::new();
    let request = selector
        .confirm(&mut notifier, |b, r, d| calls.push((b.to_string(), r.to_string(), d)))
        .unwrap();
    assert_eq!(calls, vec![("nascentes".to_string(), "uso".to_string(), 500.0)]);
    assert!(notifier.warnings.is_empty());

    let mut reporter = ProgressReporter::new();
    let zone_id = run_buffer_zone(&request, &mut layers, &EnvelopeCalculator, &mut reporter).unwrap();
    assert_eq!(reporter.state(), &ProgressState::Success);
    assert_eq!(zone_id, "buffer_nascentes_500m");

    // La zone contient les nascentes
    let mut adapter = MapAdapter::default();
    let mut viewport = Viewport::new(1024, 768);
    let mut outcome = None;
    adapter.zoom_to_layer(Some(&zone_id), &layers, &mut viewport, |o| outcome = Some(o));
    assert_eq!(adapter.state(), MapState::Idle);
    let Some(ZoomOutcome::Framed(zone_bounds)) = outcome else {
        panic!("zone layer should be framed, got {:?}", outcome);
    };
    let source_bounds = layer_bounds(layers.get("nascentes").unwrap()).unwrap();
    assert!(zone_bounds.contains(source_bounds.south_west));
    assert!(zone_bounds.contains(source_bounds.north_east));
    assert!(viewport.camera().unwrap().zoom <= 12);

    // Export puis relecture
    let dir = tempfile::tempdir().unwrap();
    let zone = layers.get(&zone_id).unwrap();
    let saved = save_layer(zone, ExportFormat::GeoJson, dir.path()).unwrap();
    assert!(saved
        .path
        .ends_with("zona_de_amortecimento_nascentes_500_m.geojson"));

    let reloaded = load_file(&saved.path).unwrap();
    assert!(reloaded.errors.is_empty());
    assert_eq!(reloaded.layer.feature_count(), zone.feature_count());
    for (a, b) in zone.features().iter().zip(reloaded.layer.features()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.geometry, b.geometry);
    }
}

#[test]
fn test_rejected_selection_never_calculates() {
    let layers = load_layers();
    let mut selector = BufferZoneSelector::default();
    selector.open(&layers);
    selector.select_reference(Some("nascentes")).unwrap();

    let mut notifier = RecordingNotifier::default();
    let mut called = false;
    let err = selector.confirm(&mut notifier, |_, _, _| called = true).unwrap_err();
    assert_eq!(err, SelectionError::SameLayer);
    assert!(!called);
    assert_eq!(notifier.warnings.len(), 1);

    selector.select_reference(Some("uso")).unwrap();
    for distance in [0.0, -10.0, f64::NAN] {
        selector.set_distance(distance);
        assert!(selector.confirm(&mut notifier, |_, _, _| called = true).is_err());
    }
    assert!(!called);
}

#[test]
fn test_hidden_layers_block_selection() {
    let mut layers = load_layers();
    layers.get_mut("uso").unwrap().set_visible(false);

    let mut selector = BufferZoneSelector::default();
    selector.open(&layers);
    assert!(selector.is_blocked());
    assert!(!selector.can_confirm());

    let mut notifier = RecordingNotifier::default();
    let err = selector.confirm(&mut notifier, |_, _, _| {}).unwrap_err();
    assert_eq!(err, SelectionError::InsufficientLayers);
}
