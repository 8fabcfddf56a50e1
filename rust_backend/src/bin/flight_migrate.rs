//! Ledger migration tool.
//!
//! Converts ledger entries written before range units were tracked into
//! microseconds on each flight's timeline. The timeline of flight `<id>` is
//! read from `<csv_dir>/<id>.csv`.
//!
//! # Usage
//!
//! ```bash
//! flight-migrate <csv_dir> <ledger.json>
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

use flight_annotator::annotations::AnnotationLedger;
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
        anyhow::bail!("Usage: {} <csv_dir> <ledger.json>", args[0]);
    }
    let csv_dir = PathBuf::from(&args[1]);
    let ledger_path = PathBuf::from(&args[2]);

    let ledger = AnnotationLedger::open(&ledger_path)
        .with_context(|| format!("Failed to open ledger {}", ledger_path.display()))?;
    let pending = ledger.untagged_flights().len();
    if pending == 0 {
        info!("All {} ledger entries are already in microseconds", ledger.flight_count());
        return Ok(());
    }
    info!("Migrating {} legacy ledger entries", pending);

    let summary = FlightLoader::migrate_ledger(&ledger, &csv_dir)?;

    println!("=== Ledger migration ===");
    println!("Migrated: {}", summary.migrated.len());
    for (flight_id, units) in &summary.migrated {
        println!("  {} (from {:?})", flight_id, units);
    }
    if !summary.unresolved.is_empty() {
        warn!("{} entries left untouched", summary.unresolved.len());
        println!("Unresolved: {}", summary.unresolved.len());
        for (flight_id, reason) in &summary.unresolved {
            println!("  {}: {}", flight_id, reason);
        }
    }

    Ok(())
}
