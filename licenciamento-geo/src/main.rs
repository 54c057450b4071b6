//! Point d'entrée CLI pour licenciamento-geo

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Exporter et cadrer les couches géographiques du licenciement environnemental
#[derive(Parser)]
#[command(name = "licenciamento-geo")]
#[command(author, version)]
#[command(about = "Export GeoJSON/KML/CSV, emprise et métriques des couches, demandes de zone d'amortecimento")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Export {
            input,
            format,
            output,
            name,
            report,
        } => {
            debug!(inputs = input.len(), output = %output.display(), "Export");
            let report = cli::cmd_export(&input, &format, &output, name.as_deref(), report.as_deref())?;
            report.display();
            if report.status == licenciamento_geo::report::ExportStatus::Failed {
                anyhow::bail!("Export failed: {}", report.summary());
            }
        }
        Commands::Bounds {
            input,
            width,
            height,
        } => cli::cmd_bounds(&input, width, height)?,
        Commands::Metrics { input, json } => cli::cmd_metrics(&input, json)?,
        Commands::BufferRequest {
            input,
            base,
            reference,
            distance,
            defaults,
        } => cli::cmd_buffer_request(
            &input,
            base.as_deref(),
            reference.as_deref(),
            distance,
            &defaults,
        )?,
        Commands::Config => cli::cmd_config()?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
