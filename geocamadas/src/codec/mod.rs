//! Codecs d'export des couches (GeoJSON, KML, CSV)

pub mod csv;
pub mod filename;
pub mod geojson;
pub mod kml;

use serde::{Deserialize, Serialize};

use crate::types::GeoLayer;
use crate::GeoError;

pub use filename::sanitize_filename;

/// Format de fichier d'export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    GeoJson,
    Kml,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::GeoJson, ExportFormat::Kml, ExportFormat::Csv];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Kml => "kml",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "application/geo+json",
            ExportFormat::Kml => "application/vnd.google-earth.kml+xml",
            ExportFormat::Csv => "text/csv;charset=utf-8",
        }
    }

    /// Encode une couche complète dans ce format
    pub fn encode(self, layer: &GeoLayer) -> Result<String, GeoError> {
        match self {
            ExportFormat::GeoJson => geojson::encode(layer),
            ExportFormat::Kml => Ok(kml::encode(layer)),
            ExportFormat::Csv => Ok(csv::encode(layer)),
        }
    }

    /// Nom de fichier dérivé du nom de la couche
    pub fn filename(self, layer_name: &str) -> String {
        format!("{}.{}", sanitize_filename(layer_name), self.extension())
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geojson" | "json" => Ok(ExportFormat::GeoJson),
            "kml" => Ok(ExportFormat::Kml),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unknown export format: {}. Use: geojson, kml, csv", s)),
        }
    }
}
