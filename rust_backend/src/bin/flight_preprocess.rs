//! Flight log preprocessing tool.
//!
//! Converts every decoded topic dump (`*.json`) under a directory into an
//! aligned CSV table, mirroring the directory layout.
//!
//! # Usage
//!
//! ```bash
//! flight-preprocess <dump_dir> <csv_dir> [config.toml]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter, e.g. `debug` or `flight_annotator=trace` (default: info)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flight_annotator::config::PipelineConfig;
use flight_annotator::preprocessing::FlightPipeline;

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        anyhow::bail!("Usage: {} <dump_dir> <csv_dir> [config.toml]", args[0]);
    }
    let input_dir = PathBuf::from(&args[1]);
    let output_dir = PathBuf::from(&args[2]);
    let config_path = args.get(3).map(PathBuf::from);

    let config =
        PipelineConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    info!(
        "Preprocessing {} -> {} (min_samples={}, min_rows={}, reference={:?}, strategy={:?})",
        input_dir.display(),
        output_dir.display(),
        config.alignment.min_samples,
        config.alignment.min_rows,
        config.alignment.reference_policy,
        config.alignment.resample_strategy
    );

    let pipeline = FlightPipeline::new(&config);
    let summary = pipeline
        .process_directory(&input_dir, &output_dir)
        .with_context(|| format!("Failed to process {}", input_dir.display()))?;

    println!();
    println!("=== Preprocessing summary ===");
    println!("Flights found:   {}", summary.total());
    println!("Tables written:  {}", summary.written.len());
    println!("Flights skipped: {}", summary.skipped.len());
    for (flight_id, reason) in &summary.skipped {
        println!("  {}: {}", flight_id, reason);
    }
    println!("Flights failed:  {}", summary.failed.len());
    for (flight_id, error) in &summary.failed {
        println!("  {}: {}", flight_id, error);
    }

    Ok(())
}
