//! Writing ledger annotations into an aligned flight table.
//!
//! Burned-in tables carry two extra columns: `anomaly` (0/1) and
//! `anomaly_class` (class label, empty on unmarked rows).

use polars::prelude::*;

use crate::annotations::model::{AnnotationRange, AnomalyClass};
use crate::annotations::units::RangeUnits;

pub const ANOMALY_COLUMN: &str = "anomaly";
pub const ANOMALY_CLASS_COLUMN: &str = "anomaly_class";

fn timestamps_of(df: &DataFrame) -> PolarsResult<Vec<Option<f64>>> {
    let timestamps = df.column("timestamp")?.cast(&DataType::Float64)?;
    Ok(timestamps.f64()?.into_iter().collect())
}

fn flags_of(df: &DataFrame) -> PolarsResult<Vec<i32>> {
    if !has_column(df, ANOMALY_COLUMN) {
        return Ok(vec![0; df.height()]);
    }
    let flags = df.column(ANOMALY_COLUMN)?.cast(&DataType::Float64)?;
    Ok(flags
        .f64()?
        .into_iter()
        .map(|v| match v {
            Some(v) if v != 0.0 => 1,
            _ => 0,
        })
        .collect())
}

fn classes_of(df: &DataFrame) -> PolarsResult<Vec<String>> {
    if !has_column(df, ANOMALY_CLASS_COLUMN) {
        return Ok(vec![String::new(); df.height()]);
    }
    Ok(df
        .column(ANOMALY_CLASS_COLUMN)?
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Rows of `df` covered by `ranges`, inclusive on both ends.
fn marked_rows(
    df: &DataFrame,
    ranges: &[AnnotationRange],
    units: RangeUnits,
) -> PolarsResult<Vec<bool>> {
    let rows = df.height();
    let mut marked = vec![false; rows];
    if rows == 0 {
        return Ok(marked);
    }

    let intervals = ranges.iter().flat_map(|r| r.intervals.iter());
    match units {
        RangeUnits::RowIndex => {
            let last = rows as i64 - 1;
            for interval in intervals {
                let start = interval.start.clamp(0, last) as usize;
                let end = interval.end.clamp(0, last) as usize;
                for flag in marked.iter_mut().take(end + 1).skip(start) {
                    *flag = true;
                }
            }
        }
        RangeUnits::Milliseconds | RangeUnits::Microseconds => {
            let scale = if units == RangeUnits::Milliseconds { 1_000.0 } else { 1.0 };
            let timestamps = timestamps_of(df)?;
            for interval in intervals {
                let start = interval.start as f64 * scale;
                let end = interval.end as f64 * scale;
                for (flag, ts) in marked.iter_mut().zip(&timestamps) {
                    if let Some(ts) = ts {
                        if *ts >= start && *ts <= end {
                            *flag = true;
                        }
                    }
                }
            }
        }
    }
    Ok(marked)
}

/// Mark every row covered by `ranges` as an anomaly of `class_label`.
///
/// Adds the `anomaly` and `anomaly_class` columns when missing. Rows marked
/// earlier keep their flag; a row marked again takes the newer class.
/// Returns the number of rows marked by this call.
pub fn burn_in(
    df: &mut DataFrame,
    ranges: &[AnnotationRange],
    class_label: AnomalyClass,
    units: RangeUnits,
) -> PolarsResult<usize> {
    let marked = marked_rows(df, ranges, units)?;
    let mut flags = flags_of(df)?;
    let mut classes = classes_of(df)?;

    let mut count = 0;
    for (idx, _) in marked.iter().enumerate().filter(|(_, m)| **m) {
        flags[idx] = 1;
        classes[idx] = class_label.as_str().to_string();
        count += 1;
    }

    df.with_column(Series::new(ANOMALY_COLUMN.into(), flags))?;
    df.with_column(Series::new(ANOMALY_CLASS_COLUMN.into(), classes))?;
    Ok(count)
}

/// Maximal runs of consecutive anomalous rows as inclusive
/// `(start_row, end_row)` pairs. A table without an `anomaly` column has
/// none.
pub fn anomaly_runs(df: &DataFrame) -> PolarsResult<Vec<(usize, usize)>> {
    let flags = flags_of(df)?;
    let mut runs = Vec::new();
    let mut open: Option<usize> = None;
    for (idx, flag) in flags.iter().enumerate() {
        match (*flag, open) {
            (1, None) => open = Some(idx),
            (0, Some(start)) => {
                runs.push((start, idx - 1));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        runs.push((start, flags.len() - 1));
    }
    Ok(runs)
}
