use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::core::catalog::TopicCatalog;
use crate::io::loaders::{discover_files, flight_id_for, FlightLoader};
use crate::parsing::csv_parser;
use crate::parsing::topic_parser::{extract_series, TopicSource};
use crate::preprocessing::assembler::{AssemblyOutcome, TableAssembler};
use crate::preprocessing::validator::SkipReason;

/// What happened to one flight.
#[derive(Debug, Clone, PartialEq)]
pub enum FlightOutcome {
    Written {
        flight_id: String,
        output: PathBuf,
        rows: usize,
        columns: usize,
    },
    Skipped {
        flight_id: String,
        reason: SkipReason,
    },
}

/// Tally of a directory run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub written: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
    pub failed: Vec<(String, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }
}

/// Decoded flight log → aligned CSV table.
pub struct FlightPipeline {
    catalog: TopicCatalog,
    assembler: TableAssembler,
}

impl FlightPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            catalog: config.catalog(),
            assembler: TableAssembler::new(config.alignment.clone()),
        }
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    /// Extract the catalog series from `source` and assemble the table.
    pub fn process_source(&self, source: &dyn TopicSource) -> Result<AssemblyOutcome> {
        let series = extract_series(source, &self.catalog).context("Malformed series in log")?;
        log::debug!("Extracted {} series", series.len());
        self.assembler.assemble(&series)
    }

    /// Process one topic dump file into `output`.
    ///
    /// Skipped flights write nothing.
    pub fn process_file(&self, flight_id: &str, input: &Path, output: &Path) -> Result<FlightOutcome> {
        let dump = FlightLoader::load_dump(input)?;
        match self.process_source(&dump)? {
            AssemblyOutcome::Skipped(reason) => Ok(FlightOutcome::Skipped {
                flight_id: flight_id.to_string(),
                reason,
            }),
            AssemblyOutcome::Assembled(mut table) => {
                csv_parser::write_flight_csv(&mut table.dataframe, output)?;
                Ok(FlightOutcome::Written {
                    flight_id: flight_id.to_string(),
                    output: output.to_path_buf(),
                    rows: table.row_count(),
                    columns: table.data_column_count(),
                })
            }
        }
    }

    /// Process every `*.json` dump under `input_dir`, mirroring its
    /// subdirectories under `output_dir` with `.csv` files.
    ///
    /// A flight that fails is logged and recorded; the run continues.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
        let files = discover_files(input_dir, "json")?;
        log::info!("Found {} flight logs under {}", files.len(), input_dir.display());

        let mut summary = BatchSummary::default();
        for (idx, input) in files.iter().enumerate() {
            let flight_id = match flight_id_for(input_dir, input) {
                Ok(id) => id,
                Err(err) => {
                    log::error!("{} | {:#}", idx, err);
                    summary
                        .failed
                        .push((input.display().to_string(), format!("{:#}", err)));
                    continue;
                }
            };
            let output = output_dir.join(format!("{}.csv", flight_id));
            log::info!("{} | Converting {} to csv", idx, flight_id);

            match self.process_file(&flight_id, input, &output) {
                Ok(FlightOutcome::Written { rows, columns, .. }) => {
                    log::info!("{} | Wrote {} ({} rows, {} columns)", idx, output.display(), rows, columns);
                    summary.written.push(flight_id);
                }
                Ok(FlightOutcome::Skipped { reason, .. }) => {
                    log::warn!("{} | Skipping {}: {}", idx, flight_id, reason);
                    summary.skipped.push((flight_id, reason));
                }
                Err(err) => {
                    log::error!("{} | Failed to convert {}: {:#}", idx, input.display(), err);
                    summary.failed.push((flight_id, format!("{:#}", err)));
                }
            }
        }
        Ok(summary)
    }
}

impl Default for FlightPipeline {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}
