//! Turning a flight's decoded series into one aligned table.

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::algorithms::resampling::{align_to_reference, AlignedFlight};
use crate::config::AlignmentSettings;
use crate::core::domain::{Series, SourceId};
use crate::parsing::csv_parser::TIMESTAMP_COLUMN;
use crate::preprocessing::validator::{FlightValidator, SkipReason};

/// An aligned table ready to be written.
#[derive(Debug, Clone)]
pub struct FlightTable {
    pub dataframe: DataFrame,
    pub reference: SourceId,
}

impl FlightTable {
    pub fn row_count(&self) -> usize {
        self.dataframe.height()
    }

    /// Data columns, `timestamp` excluded.
    pub fn data_column_count(&self) -> usize {
        self.dataframe.width().saturating_sub(1)
    }
}

#[derive(Debug, Clone)]
pub enum AssemblyOutcome {
    Assembled(FlightTable),
    Skipped(SkipReason),
}

/// Selects a reference, aligns every series onto it and builds the table,
/// enforcing the minimum-length policy on both sides of the alignment.
#[derive(Debug, Clone)]
pub struct TableAssembler {
    settings: AlignmentSettings,
    validator: FlightValidator,
}

impl TableAssembler {
    pub fn new(settings: AlignmentSettings) -> Self {
        let validator = FlightValidator::from_settings(&settings);
        Self {
            settings,
            validator,
        }
    }

    pub fn assemble(&self, series: &[Series]) -> Result<AssemblyOutcome> {
        if let Some(reason) = self.validator.check_series(series) {
            return Ok(AssemblyOutcome::Skipped(reason));
        }

        let reference_index = match self.settings.reference_policy.select(series) {
            Some(idx) => idx,
            None => return Ok(AssemblyOutcome::Skipped(SkipReason::NoSeries)),
        };
        let reference = series[reference_index].source_id().clone();
        log::debug!(
            "Reference series {} with {} samples",
            reference,
            series[reference_index].len()
        );

        let aligned = align_to_reference(
            series,
            reference_index,
            self.settings.resample_strategy.resampler(),
        )
        .context("Reference index out of range")?;

        if let Some(reason) = self.validator.check_rows(aligned.row_count()) {
            return Ok(AssemblyOutcome::Skipped(reason));
        }

        let dataframe = aligned_to_dataframe(&aligned)?;
        Ok(AssemblyOutcome::Assembled(FlightTable {
            dataframe,
            reference,
        }))
    }
}

impl Default for TableAssembler {
    fn default() -> Self {
        Self::new(AlignmentSettings::default())
    }
}

/// Build the table: `timestamp` first, then one column per series in
/// input order.
pub fn aligned_to_dataframe(aligned: &AlignedFlight) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(aligned.series.len() + 1);
    columns.push(Column::new(TIMESTAMP_COLUMN.into(), aligned.axis.clone()));
    for s in &aligned.series {
        columns.push(Column::new(
            s.source_id().column_name().into(),
            s.values().to_vec(),
        ));
    }
    DataFrame::new(columns).context("Failed to build aligned DataFrame")
}
