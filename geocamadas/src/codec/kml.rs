//! Export KML 2.2
//!
//! Chaque feature devient un `Placemark` au style fixe (contour bleu, remplissage
//! bleu translucide). Seuls les contours extérieurs sont écrits : les trous des
//! polygones ne sont pas représentés.

use std::fmt::Write;

use crate::types::{FeatureGeometry, GeoFeature, GeoLayer, Position, Ring};

/// Description du document KML
pub const DOCUMENT_DESCRIPTION: &str = "Exportado do Sistema de Licenciamento Ambiental";

/// Couleur du contour (aabbggrr : bleu opaque)
pub const LINE_COLOR: &str = "ffff0000";

/// Couleur du remplissage (aabbggrr : bleu, alpha 0x4d)
pub const FILL_COLOR: &str = "4dff0000";

/// Encode une couche en document KML
pub fn encode(layer: &GeoLayer) -> String {
    let mut kml = String::new();
    kml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    kml.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    kml.push_str("  <Document>\n");
    let _ = writeln!(kml, "    <name>{}</name>", escape_xml(&layer.name));
    let _ = writeln!(kml, "    <description>{}</description>", DOCUMENT_DESCRIPTION);

    for feature in layer.features() {
        write_placemark(&mut kml, feature);
    }

    kml.push_str("  </Document>\n");
    kml.push_str("</kml>\n");
    kml
}

fn write_placemark(kml: &mut String, feature: &GeoFeature) {
    let properties = serde_json::Value::Object(
        feature
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    );

    kml.push_str("    <Placemark>\n");
    let _ = writeln!(kml, "      <name>{}</name>", escape_xml(&feature.name));
    let _ = writeln!(
        kml,
        "      <description>{}</description>",
        escape_xml(&properties.to_string())
    );
    let _ = writeln!(
        kml,
        "      <Style>\n        <LineStyle>\n          <color>{}</color>\n          <width>2</width>\n        </LineStyle>\n        <PolyStyle>\n          <color>{}</color>\n          <fill>1</fill>\n          <outline>1</outline>\n        </PolyStyle>\n      </Style>",
        LINE_COLOR, FILL_COLOR
    );
    write_geometry(kml, &feature.geometry);
    kml.push_str("    </Placemark>\n");
}

fn write_geometry(kml: &mut String, geometry: &FeatureGeometry) {
    match geometry {
        FeatureGeometry::Point(position) => {
            let _ = writeln!(
                kml,
                "      <Point><coordinates>{}</coordinates></Point>",
                format_position(position)
            );
        }
        FeatureGeometry::Polygon(rings) => {
            if let Some(outer) = rings.first() {
                write_polygon(kml, outer, "      ");
            }
        }
        FeatureGeometry::MultiPolygon(polygons) => {
            kml.push_str("      <MultiGeometry>\n");
            for outer in polygons.iter().filter_map(|rings| rings.first()) {
                write_polygon(kml, outer, "        ");
            }
            kml.push_str("      </MultiGeometry>\n");
        }
    }
}

fn write_polygon(kml: &mut String, outer: &Ring, indent: &str) {
    let _ = writeln!(
        kml,
        "{i}<Polygon>\n{i}  <outerBoundaryIs>\n{i}    <LinearRing>\n{i}      <coordinates>{c}</coordinates>\n{i}    </LinearRing>\n{i}  </outerBoundaryIs>\n{i}</Polygon>",
        i = indent,
        c = format_ring(outer)
    );
}

/// Formate un anneau en suite de tokens `lng,lat,0`
pub fn format_ring(ring: &Ring) -> String {
    ring.iter().map(format_position).collect::<Vec<_>>().join(" ")
}

fn format_position(position: &Position) -> String {
    format!("{},{},0", position[0], position[1])
}

/// Échappe une chaîne pour XML
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }
    result
}
