use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::algorithms::analysis::FlightSummary;
use crate::annotations::{detect, AnnotationLedger, LedgerStore, RangeUnits};
use crate::core::catalog::SensorFamily;
use crate::parsing::csv_parser;
use crate::parsing::topic_parser::{self, TopicDump};

/// All files under `root` (recursively) with the given extension, sorted
/// by path. The extension match ignores case.
pub fn discover_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to list directory {}", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to read entry in {}", dir.display()))?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Ledger key of a flight file: its path relative to `root`, without
/// extension, with `/` separators.
pub fn flight_id_for(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).with_context(|| {
        format!("{} is not under {}", path.display(), root.display())
    })?;
    let stem = relative.with_extension("");
    let parts: Vec<String> = stem
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        anyhow::bail!("Cannot derive a flight id from {}", path.display());
    }
    Ok(parts.join("/"))
}

/// Tally of a ledger migration run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationSummary {
    pub migrated: Vec<(String, RangeUnits)>,
    pub unresolved: Vec<(String, String)>,
}

/// Unified interface for loading flight data.
pub struct FlightLoader;

impl FlightLoader {
    /// Load a decoded topic dump.
    pub fn load_dump(path: &Path) -> Result<TopicDump> {
        topic_parser::parse_topic_dump(path).context("Failed to load topic dump")
    }

    /// Load an aligned flight table.
    pub fn load_table(path: &Path) -> Result<DataFrame> {
        csv_parser::parse_flight_csv(path).context("Failed to load flight table")
    }

    /// Summaries of every flight table under `csv_dir`.
    ///
    /// A table that cannot be read or summarized is logged and left out.
    pub fn load_summaries(csv_dir: &Path, families: &[SensorFamily]) -> Result<Vec<FlightSummary>> {
        let files = discover_files(csv_dir, "csv")?;
        log::info!("Summarizing {} flight tables under {}", files.len(), csv_dir.display());

        let mut summaries = Vec::with_capacity(files.len());
        for (idx, path) in files.iter().enumerate() {
            let summary = flight_id_for(csv_dir, path).and_then(|flight_id| {
                let df = Self::load_table(path)?;
                FlightSummary::from_table(&flight_id, &df, families)
                    .context("Failed to summarize flight table")
            });
            match summary {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => log::warn!("{} | {} is empty, skipping", idx, path.display()),
                Err(err) => log::error!("{} | Failed to summarize {}: {:#}", idx, path.display(), err),
            }
        }
        Ok(summaries)
    }

    /// Convert every legacy ledger entry to microseconds, reading each
    /// flight's timeline from `<csv_dir>/<flight_id>.csv`.
    ///
    /// Entries that already name their units are converted from those. The
    /// others are converted from whatever [`detect`] finds; when detection is
    /// ambiguous, or the table is missing or unreadable, the entry is left as
    /// it is and listed as unresolved. An entry without intervals is tagged
    /// as is.
    pub fn migrate_ledger<S: LedgerStore>(
        ledger: &AnnotationLedger<S>,
        csv_dir: &Path,
    ) -> Result<MigrationSummary> {
        let mut summary = MigrationSummary::default();

        for flight_id in ledger.untagged_flights() {
            let Some(entry) = ledger.entry(&flight_id) else {
                continue;
            };
            let has_intervals = entry
                .annotations
                .iter()
                .any(|record| record.intervals().next().is_some());
            if !has_intervals {
                ledger.migrate_flight(&flight_id, RangeUnits::Microseconds, &[])?;
                summary.migrated.push((flight_id, RangeUnits::Microseconds));
                continue;
            }

            let path = csv_dir.join(format!("{}.csv", flight_id));
            let timestamps = match Self::load_table(&path)
                .and_then(|df| csv_parser::table_timestamps(&df))
            {
                Ok(timestamps) => timestamps,
                Err(err) => {
                    log::warn!("Cannot migrate {}: {:#}", flight_id, err);
                    summary.unresolved.push((flight_id, format!("{:#}", err)));
                    continue;
                }
            };

            match entry
                .range_units
                .or_else(|| detect(&entry.annotations, &timestamps))
            {
                Some(units) => {
                    ledger
                        .migrate_flight(&flight_id, units, &timestamps)
                        .with_context(|| format!("Failed to migrate {}", flight_id))?;
                    summary.migrated.push((flight_id, units));
                }
                None => {
                    log::warn!("Cannot migrate {}: range units are ambiguous", flight_id);
                    summary
                        .unresolved
                        .push((flight_id, "range units are ambiguous".to_string()));
                }
            }
        }

        Ok(summary)
    }
}
