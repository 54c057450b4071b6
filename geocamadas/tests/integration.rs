//! Tests d'intégration : export puis relecture des couches

use geocamadas::load::load_str;
use geocamadas::{ExportFormat, FeatureGeometry, GeoFeature, GeoLayer, GeometryKind};
use geojson::{GeoJson, Value};

fn sample_layer() -> GeoLayer {
    let mut layer = GeoLayer::new("zona", "Zona de Amortecimento").with_style("#2563eb", 0.6);
    layer.add_feature(
        GeoFeature::new("pt", "Captação", FeatureGeometry::Point([-63.123456789012345, -8.7654321]))
            .with_property("vazao_m3h", 12.75),
    );
    layer.add_feature(GeoFeature::new(
        "pg",
        "Gleba com reserva",
        FeatureGeometry::Polygon(vec![
            vec![[-63.9, -8.7], [-63.9, -8.8], [-63.8, -8.8], [-63.8, -8.7], [-63.9, -8.7]],
            vec![[-63.86, -8.74], [-63.84, -8.74], [-63.84, -8.76], [-63.86, -8.74]],
        ]),
    ));
    layer.add_feature(GeoFeature::new(
        "mp",
        "Fragmentos",
        FeatureGeometry::MultiPolygon(vec![
            vec![vec![[0.1, 0.2], [0.3, 0.2], [0.3, 0.4], [0.1, 0.2]]],
            vec![vec![[1.0 / 3.0, 2.0 / 3.0], [1.0, 2.0 / 3.0], [1.0, 1.0], [1.0 / 3.0, 2.0 / 3.0]]],
        ]),
    ));
    layer
}

fn expected_value(geometry: &FeatureGeometry) -> Value {
    let rings = |rings: &Vec<Vec<[f64; 2]>>| -> Vec<Vec<Vec<f64>>> {
        rings.iter().map(|r| r.iter().map(|p| p.to_vec()).collect()).collect()
    };
    match geometry {
        FeatureGeometry::Point(p) => Value::Point(p.to_vec()),
        FeatureGeometry::Polygon(r) => Value::Polygon(rings(r)),
        FeatureGeometry::MultiPolygon(ps) => Value::MultiPolygon(ps.iter().map(rings).collect()),
    }
}

#[test]
fn test_geojson_export_round_trip_is_identity() {
    let layer = sample_layer();
    let text = ExportFormat::GeoJson.encode(&layer).unwrap();

    let GeoJson::FeatureCollection(collection) = text.parse::<GeoJson>().unwrap() else {
        panic!("expected a FeatureCollection");
    };
    assert_eq!(collection.features.len(), layer.feature_count());

    for (parsed, source) in collection.features.iter().zip(layer.features()) {
        let geometry = parsed.geometry.as_ref().unwrap();
        assert_eq!(geometry.value, expected_value(&source.geometry), "feature {}", source.id);
        assert_eq!(parsed.property("id").and_then(|v| v.as_str()), Some(source.id.as_str()));
    }
}

#[test]
fn test_export_then_load_restores_features() {
    let layer = sample_layer();
    let text = ExportFormat::GeoJson.encode(&layer).unwrap();

    let reloaded = load_str(&text, "zona", "Zona de Amortecimento").unwrap();
    assert!(reloaded.errors.is_empty());
    assert_eq!(reloaded.layer.feature_count(), 3);

    for (a, b) in reloaded.layer.features().iter().zip(layer.features()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.geometry, b.geometry);
    }
    assert_eq!(reloaded.layer.features()[2].kind(), GeometryKind::MultiPolygon);
}

#[test]
fn test_every_format_encodes_every_feature() {
    let layer = sample_layer();

    let kml = ExportFormat::Kml.encode(&layer).unwrap();
    assert_eq!(kml.matches("<Placemark>").count(), 3);

    let csv = ExportFormat::Csv.encode(&layer).unwrap();
    assert_eq!(csv.lines().count(), 4);

    assert_eq!(
        ExportFormat::ALL.map(|f| f.filename(&layer.name)),
        [
            "zona_de_amortecimento.geojson",
            "zona_de_amortecimento.kml",
            "zona_de_amortecimento.csv"
        ]
    );
}
