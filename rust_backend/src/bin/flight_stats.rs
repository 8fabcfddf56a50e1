//! Corpus statistics tool.
//!
//! Summarizes every aligned table under a directory, combines the
//! summaries with the annotation ledger and prints sensor coverage and
//! annotated durations per anomaly class.
//!
//! # Usage
//!
//! ```bash
//! flight-stats <csv_dir> <ledger.json> [config.toml]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter, e.g. `debug` or `flight_annotator=trace` (default: info)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use flight_annotator::algorithms::DurationAggregator;
use flight_annotator::annotations::AnnotationLedger;
use flight_annotator::config::PipelineConfig;
use flight_annotator::io::loaders::FlightLoader;

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        anyhow::bail!("Usage: {} <csv_dir> <ledger.json> [config.toml]", args[0]);
    }
    let csv_dir = PathBuf::from(&args[1]);
    let ledger_path = PathBuf::from(&args[2]);
    let config_path = args.get(3).map(PathBuf::from);

    let config =
        PipelineConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    let families = config.statistics.sensor_families.clone();

    let summaries = FlightLoader::load_summaries(&csv_dir, &families)
        .with_context(|| format!("Failed to summarize {}", csv_dir.display()))?;
    let ledger = AnnotationLedger::open(&ledger_path)
        .with_context(|| format!("Failed to open ledger {}", ledger_path.display()))?;
    info!(
        "{} flight tables, {} annotated flights in ledger",
        summaries.len(),
        ledger.flight_count()
    );

    let untagged = ledger.untagged_flights();
    if !untagged.is_empty() {
        warn!(
            "{} ledger entries carry no range units and are left out of the statistics; run flight-migrate to convert them",
            untagged.len()
        );
    }

    let report = DurationAggregator::new(families).aggregate(&summaries, &ledger.snapshot());

    println!("=== Flight statistics ===");
    print!("{}", report);

    println!("\nAnnotated flights:");
    let mut annotated: Vec<String> = ledger.all_flight_ids().into_iter().collect();
    annotated.sort();
    for flight_id in annotated {
        let classes: Vec<String> = ledger
            .classes_for(&flight_id)
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("  {}: {}", flight_id, classes.join(", "));
    }

    Ok(())
}
