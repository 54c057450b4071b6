//! Définition et implémentation des commandes CLI
//!
//! - `export`: GeoJSON → GeoJSON/KML/CSV
//! - `bounds`: emprise et caméra d'une couche
//! - `metrics`: surfaces et périmètres géodésiques
//! - `buffer-request`: validation d'une demande de zone d'amortecimento
//! - `config`: configuration effective

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::{info, warn};

use geocamadas::load::{load_file, LoadResult};
use geocamadas::metrics::layer_metrics;
use geocamadas::validate::{close_rings, validate_feature};
use geocamadas::{ExportFormat, GeoLayer, LayerSet};
use licenciamento_geo::config::{BufferDefaults, Config};
use licenciamento_geo::download::save_layer;
use licenciamento_geo::map::{MapAdapter, Viewport, ZoomOutcome};
use licenciamento_geo::report::{ExportError, ExportReport};
use licenciamento_geo::selector::TracingNotifier;

#[derive(Subcommand)]
pub enum Commands {
    /// Export GeoJSON layers to GeoJSON, KML or CSV files
    Export {
        /// GeoJSON file(s) to export
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output format(s): geojson, kml, csv (défaut : tous)
        #[arg(short, long)]
        format: Vec<ExportFormat>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Layer display name override (single input only)
        #[arg(long)]
        name: Option<String>,

        /// Save the export report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the bounds of a layer and the camera framing it
    Bounds {
        /// GeoJSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Viewport width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 768)]
        height: u32,
    },

    /// Print geodesic area and perimeter per feature
    Metrics {
        /// GeoJSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a buffer-zone request over loaded layers
    BufferRequest {
        /// GeoJSON layer files (at least two)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Base layer id (défaut : première couche)
        #[arg(long)]
        base: Option<String>,

        /// Reference layer id (défaut : seconde couche)
        #[arg(long)]
        reference: Option<String>,

        /// Buffer distance in meters
        #[arg(short, long)]
        distance: Option<f64>,

        /// Buffer defaults preset (default/app) or path to a JSON file
        #[arg(long, default_value = "default")]
        defaults: String,
    },

    /// Print the effective configuration
    Config,
}

/// Exécute la commande export
pub fn cmd_export(
    inputs: &[PathBuf],
    formats: &[ExportFormat],
    output: &Path,
    name: Option<&str>,
    report_path: Option<&Path>,
) -> Result<ExportReport> {
    if name.is_some() && inputs.len() > 1 {
        anyhow::bail!("--name can only be used with a single input");
    }

    let formats = if formats.is_empty() {
        ExportFormat::ALL.to_vec()
    } else {
        formats.to_vec()
    };

    std::fs::create_dir_all(output)
        .context(format!("Failed to create output directory: {}", output.display()))?;

    let start = Instant::now();
    let mut report = ExportReport::default();

    for input in inputs {
        let mut layer = match load_layer(input, &mut report) {
            Ok(layer) => layer,
            Err(e) => {
                warn!(input = %input.display(), error = %e, "Failed to load layer");
                report.record_error(ExportError {
                    layer: Some(input.display().to_string()),
                    format: None,
                    message: format!("{:#}", e),
                });
                continue;
            }
        };
        if let Some(name) = name {
            layer.name = name.to_string();
        }

        report.record_layer(layer.feature_count());

        for format in &formats {
            match save_layer(&layer, *format, output) {
                Ok(saved) => report.record_export(format.extension(), &saved),
                Err(e) => report.record_error(ExportError {
                    layer: Some(layer.id.clone()),
                    format: Some(format.extension().to_string()),
                    message: e.to_string(),
                }),
            }
        }
    }

    report.set_duration(start.elapsed());
    report.finalize();
    info!("{}", report.summary());

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Export report saved");
    }

    Ok(report)
}

/// Charge une couche, ferme les anneaux ouverts et écarte les features invalides
fn load_layer(path: &Path, report: &mut ExportReport) -> Result<GeoLayer> {
    let LoadResult { layer, errors } =
        load_file(path).context(format!("Failed to load {}", path.display()))?;

    for error in errors {
        report.record_warning(&layer.id, error.to_string());
    }

    let mut cleaned = GeoLayer::new(layer.id.clone(), layer.name.clone())
        .with_style(layer.color(), layer.opacity());
    cleaned.source = layer.source;
    cleaned.uploaded_at = layer.uploaded_at;

    for feature in layer.features() {
        let mut feature = feature.clone();
        let closed = close_rings(&mut feature);
        if closed > 0 {
            report.record_warning(
                &layer.id,
                format!("{}: {} ring(s) closed", feature.id, closed),
            );
        }
        match validate_feature(&feature) {
            Ok(()) => cleaned.add_feature(feature),
            Err(e) => report.record_warning(&layer.id, e.to_string()),
        }
    }

    Ok(cleaned)
}

/// Exécute la commande bounds
pub fn cmd_bounds(input: &Path, width: u32, height: u32) -> Result<()> {
    let LoadResult { layer, .. } =
        load_file(input).context(format!("Failed to load {}", input.display()))?;
    let layer_id = layer.id.clone();

    let mut layers = LayerSet::new();
    layers.add(layer)?;

    let mut adapter = MapAdapter::default();
    let mut viewport = Viewport::new(width, height);
    let mut outcome = None;
    adapter.zoom_to_layer(Some(&layer_id), &layers, &mut viewport, |o| outcome = Some(o));

    match (outcome, viewport.camera()) {
        (Some(ZoomOutcome::Framed(bounds)), Some(camera)) => {
            println!(
                "Bounds: [{:.6}, {:.6}] - [{:.6}, {:.6}]",
                bounds.west(),
                bounds.south(),
                bounds.east(),
                bounds.north()
            );
            println!(
                "Camera: center=({:.6}, {:.6}) zoom={} ({}x{} px)",
                camera.center.lat, camera.center.lng, camera.zoom, width, height
            );
        }
        _ => println!("Nenhuma coordenada válida em {}", input.display()),
    }

    Ok(())
}

/// Exécute la commande metrics
pub fn cmd_metrics(input: &Path, json: bool) -> Result<()> {
    let LoadResult { layer, .. } =
        load_file(input).context(format!("Failed to load {}", input.display()))?;
    let metrics = layer_metrics(&layer);

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!("{} ({} features)", layer.name, layer.feature_count());
    for (index, feature) in metrics.features.iter().enumerate() {
        println!(
            "  {:<30} {:>12.4} ha {:>10.3} km {:>6.1}%",
            feature.name,
            feature.area_ha,
            feature.perimeter_km,
            metrics.share_of_total(index).unwrap_or(0.0)
        );
    }
    println!(
        "  {:<30} {:>12.4} ha {:>10.3} km",
        "TOTAL", metrics.total_area_ha, metrics.total_perimeter_km
    );

    Ok(())
}

/// Exécute la commande buffer-request
pub fn cmd_buffer_request(
    inputs: &[PathBuf],
    base: Option<&str>,
    reference: Option<&str>,
    distance: Option<f64>,
    defaults_source: &str,
) -> Result<()> {
    let defaults = load_buffer_defaults(defaults_source)?;

    let mut layers = LayerSet::new();
    for input in inputs {
        let LoadResult { layer, .. } =
            load_file(input).context(format!("Failed to load {}", input.display()))?;
        layers
            .add(layer)
            .context(format!("Layer already loaded: {}", input.display()))?;
    }

    let mut selector = defaults.selector();
    selector.open(&layers);
    if base.is_some() {
        selector.select_base(base)?;
    }
    if reference.is_some() {
        selector.select_reference(reference)?;
    }
    if let Some(distance) = distance {
        selector.set_distance(distance);
    }

    let request = selector.confirm(&mut TracingNotifier, |base, reference, distance_m| {
        info!(base, reference, distance_m, "Buffer zone request confirmed");
    })?;

    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

/// Preset embarqué ou chemin vers un fichier JSON
fn load_buffer_defaults(source: &str) -> Result<BufferDefaults> {
    let path = Path::new(source);
    if path.exists() {
        return Config::load_buffer_defaults(path);
    }
    BufferDefaults::from_preset(source)
}

/// Exécute la commande config
pub fn cmd_config() -> Result<()> {
    let config = Config::from_env();
    println!("{}", config);
    Ok(())
}
