use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs;
use std::path::Path;

/// Name of the shared time column of an aligned table.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Parse an aligned flight CSV into a Polars DataFrame.
///
/// `timestamp` is cast to Int64, as older tables were written with float
/// timestamps; every other column is cast to Float64 except the string
/// `anomaly_class` column of burned-in tables.
pub fn parse_flight_csv(csv_path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(csv_path.into()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV into DataFrame: {}", csv_path.display()))?;

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    if !column_names.iter().any(|c| c == TIMESTAMP_COLUMN) {
        anyhow::bail!("{} has no '{}' column", csv_path.display(), TIMESTAMP_COLUMN);
    }

    let mut lazy_df = df
        .lazy()
        .with_column(col(TIMESTAMP_COLUMN).cast(DataType::Int64));

    for col_name in column_names
        .iter()
        .filter(|c| c.as_str() != TIMESTAMP_COLUMN && c.as_str() != "anomaly_class")
    {
        lazy_df = lazy_df.with_column(col(col_name.as_str()).cast(DataType::Float64));
    }

    let df = lazy_df
        .collect()
        .context("Failed to cast columns to expected types")?;

    Ok(df)
}

/// Write an aligned table as CSV with a header row.
///
/// The table is written to a sibling temporary file first and renamed into
/// place, so a failed write leaves no partial output behind.
pub fn write_flight_csv(df: &mut DataFrame, csv_path: &Path) -> Result<()> {
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let temp_path = csv_path.with_extension("csv.tmp");
    if let Err(err) = write_csv_file(df, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    fs::rename(&temp_path, csv_path)
        .with_context(|| format!("Failed to move CSV into place: {}", csv_path.display()))?;
    Ok(())
}

fn write_csv_file(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .context("Failed to write CSV")?;
    Ok(())
}

/// The table's timeline in integer microseconds.
pub fn table_timestamps(df: &DataFrame) -> Result<Vec<i64>> {
    let timestamps = df
        .column(TIMESTAMP_COLUMN)?
        .cast(&DataType::Float64)?;
    timestamps
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(idx, ts)| {
            ts.map(|t| t.round() as i64)
                .with_context(|| format!("Missing timestamp at row {}", idx))
        })
        .collect()
}
