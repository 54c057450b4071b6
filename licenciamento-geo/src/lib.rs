//! # licenciamento-geo
//!
//! Flux de travail autour des couches géographiques du licenciement
//! environnemental : sélection d'une zone d'amortecimento, suivi du calcul,
//! cadrage de la carte et export.
//!
//! ## Features
//!
//! - Sélecteur de zone (couche base, couche de référence, distance) avec validation
//! - Rapporteur de progression piloté par l'appelant
//! - Pipeline de calcul derrière un moteur géométrique externe
//! - Adaptateur carte (cadrage, clic droit) et fenêtre Web Mercator
//! - Écriture des exports et enveloppe REST du backend
//!
//! ## Usage CLI
//!
//! ```bash
//! licenciamento-geo export --input app.geojson --format kml --output ./out/
//! licenciamento-geo bounds --input app.geojson
//! licenciamento-geo buffer-request --input app.geojson --input uso.geojson --distance 500
//! ```

pub mod api;
pub mod config;
pub mod download;
pub mod map;
pub mod progress;
pub mod report;
pub mod selector;
pub mod zone;

pub use config::{BufferDefaults, Config};
pub use progress::{ProgressReporter, ProgressState};
pub use report::{ExportReport, ExportStatus};
pub use selector::{BufferZoneRequest, BufferZoneSelector, Notifier, SelectionError};
pub use zone::{run_buffer_zone, ZoneCalculator, ZoneError};
