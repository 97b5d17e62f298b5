//! Headless gameplay simulation binary.
//!
//! Loads content from a data directory, spawns a batch of entities with the
//! configured attribute set, applies the requested status effects and drives
//! the fixed-step clock for a number of host frames before printing a report.
//!
//! ```bash
//! gameplay-sim --data data --entities 8 --frames 600 --effect Effect.Poison
//! RUST_LOG=runtime=debug gameplay-sim --format json --log-file logs/sim.log
//! ```
mod report;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gameplay_content::ContentFactory;
use gameplay_core::Tag;
use gameplay_runtime::Simulation;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use report::SimulationReport;

/// Run a headless gameplay simulation
#[derive(Parser)]
#[command(name = "gameplay-sim")]
#[command(about = "Fixed-step gameplay state simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// Content directory (gameplay.toml, effects.ron, curves.ron, attributes.ron)
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data: PathBuf,

    /// Number of entities to spawn
    #[arg(short, long, default_value_t = 4)]
    entities: u32,

    /// Number of host frames to run
    #[arg(short, long, default_value_t = 300)]
    frames: u32,

    /// Host frame length in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 16.0)]
    frame_ms: f64,

    /// Status effect applied to every entity before the first frame (repeatable)
    #[arg(long = "effect", value_name = "TAG")]
    effects: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable attribute table
    Text,
    /// Pretty-printed JSON
    Json,
}

fn main() -> Result<()> {
    // Load .env file if it exists (RUST_LOG and friends)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.as_deref())?;

    let report = run(&cli)?;
    match cli.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<SimulationReport> {
    if !cli.frame_ms.is_finite() || cli.frame_ms < 0.0 {
        anyhow::bail!("frame length must be a non-negative number of milliseconds");
    }

    let factory = ContentFactory::new(&cli.data);
    let mut simulation = Simulation::builder()
        .content(&factory)
        .with_context(|| format!("Failed to load content from {}", cli.data.display()))?
        .build()?;
    let attributes = factory.load_attributes()?;

    let effects: Vec<Tag> = cli.effects.iter().map(Tag::new).collect();
    for _ in 0..cli.entities {
        let id = simulation.spawn_with(attributes.iter().cloned())?;
        for effect in &effects {
            if let Err(error) = simulation.apply_effect(id, effect) {
                tracing::warn!(entity = %id, effect = %effect, %error, "status effect not applied");
            }
        }
    }

    let frame = Duration::from_secs_f64(cli.frame_ms / 1000.0);
    let mut steps = 0u64;
    for _ in 0..cli.frames {
        steps += u64::from(simulation.frame(frame));
    }

    tracing::info!(
        frames = cli.frames,
        steps,
        entities = simulation.entity_count(),
        "simulation finished"
    );
    Ok(SimulationReport::collect(&simulation))
}

/// Logs to stderr, and to `log_file` when given. The returned guard flushes
/// the file writer on drop.
fn setup_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;

            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file {
        tracing::info!("Log file: {}", path.display());
    }
    Ok(guard)
}
