//! # geocamadas
//!
//! Modèle de couches géographiques et codecs d'export pour les cartes du
//! licenciement environnemental.
//!
//! ## Features
//!
//! - Couches et features typées (Point, Polygon, MultiPolygon) avec propriétés scalaires
//! - Export GeoJSON, KML et CSV, noms de fichiers normalisés
//! - Chargement GeoJSON avec collecte des erreurs non fatales
//! - Emprise lat/lng et métriques géodésiques (`geo`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geocamadas::{codec::ExportFormat, load};
//! use std::path::Path;
//!
//! let result = load::load_file(Path::new("app.geojson"))?;
//! let kml = ExportFormat::Kml.encode(&result.layer)?;
//! println!("{}: {} features", result.layer.name, result.layer.feature_count());
//! ```

pub mod bounds;
pub mod codec;
pub mod error;
pub mod layers;
pub mod load;
pub mod metrics;
pub mod types;
pub mod validate;

pub use bounds::{LatLng, LatLngBounds};
pub use codec::{sanitize_filename, ExportFormat};
pub use error::GeoError;
pub use layers::LayerSet;
pub use types::{
    FeatureGeometry, GeoFeature, GeoLayer, GeometryKind, LayerSource, LayerSummary, Position,
    Properties, PropertyValue, Ring,
};
