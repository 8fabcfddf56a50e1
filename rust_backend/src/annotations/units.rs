//! Range unit conventions and migration of legacy ledger entries.
//!
//! New entries are written in microseconds on the flight's own timeline.
//! Older ledgers hold either row indices into the aligned table or
//! milliseconds; those entries carry no tag and stay as loaded until
//! [`migrate`] converts them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{AnnotationRecord, FlightEntry, Interval};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeUnits {
    RowIndex,
    Milliseconds,
    Microseconds,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("cannot map row indices onto an empty timeline")]
    EmptyTimeline,
}

impl RangeUnits {
    fn admits(&self, value: i64, timestamps: &[i64]) -> bool {
        let (first, last) = match (timestamps.first(), timestamps.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return false,
        };
        match self {
            RangeUnits::RowIndex => value >= 0 && (value as usize) < timestamps.len(),
            RangeUnits::Milliseconds => {
                value >= first.div_euclid(1_000) && value <= last.div_euclid(1_000) + 1
            }
            RangeUnits::Microseconds => value >= first && value <= last,
        }
    }

    /// Convert one endpoint to microseconds on `timestamps`.
    fn to_micros(&self, value: i64, timestamps: &[i64]) -> Result<i64, UnitsError> {
        match self {
            RangeUnits::Microseconds => Ok(value),
            RangeUnits::Milliseconds => Ok(value.saturating_mul(1_000)),
            RangeUnits::RowIndex => {
                let last = timestamps.len().checked_sub(1).ok_or(UnitsError::EmptyTimeline)?;
                let row = value.clamp(0, last as i64) as usize;
                Ok(timestamps[row])
            }
        }
    }
}

const CANDIDATES: [RangeUnits; 3] = [
    RangeUnits::RowIndex,
    RangeUnits::Milliseconds,
    RangeUnits::Microseconds,
];

/// The single unit convention under which every endpoint of `records` falls
/// inside the flight described by `timestamps`.
///
/// `None` when there is nothing to look at, when no convention fits, or when
/// more than one does.
pub fn detect(records: &[AnnotationRecord], timestamps: &[i64]) -> Option<RangeUnits> {
    let endpoints: Vec<i64> = records
        .iter()
        .flat_map(|r| r.intervals().flat_map(|(_, i)| [i.start, i.end]))
        .collect();
    if endpoints.is_empty() || timestamps.is_empty() {
        return None;
    }

    let mut fitting = CANDIDATES
        .iter()
        .filter(|units| endpoints.iter().all(|&v| units.admits(v, timestamps)));
    match (fitting.next(), fitting.next()) {
        (Some(units), None) => Some(*units),
        _ => None,
    }
}

/// Rewrite every interval of `entry` from `from` into microseconds and tag
/// the entry. Entries already tagged as microseconds are left untouched.
pub fn migrate(entry: &mut FlightEntry, from: RangeUnits, timestamps: &[i64]) -> Result<(), UnitsError> {
    if entry.range_units == Some(RangeUnits::Microseconds) {
        return Ok(());
    }

    for record in entry.annotations.iter_mut() {
        for range in record.ranges.iter_mut() {
            for interval in range.intervals.iter_mut() {
                *interval = Interval::new(
                    from.to_micros(interval.start, timestamps)?,
                    from.to_micros(interval.end, timestamps)?,
                );
            }
        }
    }
    entry.range_units = Some(RangeUnits::Microseconds);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::model::{AnnotationRange, AnomalyClass};

    fn entry_with(intervals: Vec<Interval>) -> FlightEntry {
        FlightEntry {
            annotations: vec![AnnotationRecord::new(
                AnomalyClass::Altitude,
                "",
                vec![AnnotationRange::new("Altitude", intervals)],
            )],
            range_units: None,
        }
    }

    // 200 rows, 5 ms apart, starting 120 s after boot
    fn timeline() -> Vec<i64> {
        (0..200).map(|i| 120_000_000 + i * 5_000).collect()
    }

    #[test]
    fn test_detects_each_convention() {
        let ts = timeline();
        let rows = entry_with(vec![Interval::new(10, 50)]);
        let millis = entry_with(vec![Interval::new(120_100, 120_400)]);
        let micros = entry_with(vec![Interval::new(120_100_000, 120_400_000)]);

        assert_eq!(detect(&rows.annotations, &ts), Some(RangeUnits::RowIndex));
        assert_eq!(detect(&millis.annotations, &ts), Some(RangeUnits::Milliseconds));
        assert_eq!(detect(&micros.annotations, &ts), Some(RangeUnits::Microseconds));
    }

    #[test]
    fn test_ambiguous_or_foreign_ranges_are_not_detected() {
        // a timeline starting at zero admits small values under every convention
        let ts: Vec<i64> = (0..500).map(|i| i * 1_000).collect();
        let ambiguous = entry_with(vec![Interval::new(1, 3)]);
        assert_eq!(detect(&ambiguous.annotations, &ts), None);

        let foreign = entry_with(vec![Interval::new(-40, 9_000_000_000)]);
        assert_eq!(detect(&foreign.annotations, &timeline()), None);
        assert_eq!(detect(&[], &ts), None);
    }

    #[test]
    fn test_migrate_row_indices_clamps_to_table() {
        let ts = timeline();
        let mut entry = entry_with(vec![Interval::new(-3, 2), Interval::new(198, 400)]);
        migrate(&mut entry, RangeUnits::RowIndex, &ts).unwrap();

        let intervals = &entry.annotations[0].ranges[0].intervals;
        assert_eq!(intervals[0], Interval::new(ts[0], ts[2]));
        assert_eq!(intervals[1], Interval::new(ts[198], ts[199]));
        assert_eq!(entry.range_units, Some(RangeUnits::Microseconds));
    }

    #[test]
    fn test_migrate_milliseconds_scales() {
        let mut entry = entry_with(vec![Interval::new(120_100, 120_400)]);
        migrate(&mut entry, RangeUnits::Milliseconds, &[]).unwrap();
        assert_eq!(
            entry.annotations[0].ranges[0].intervals[0],
            Interval::new(120_100_000, 120_400_000)
        );
    }

    #[test]
    fn test_migrate_is_noop_on_canonical_entry() {
        let mut entry = entry_with(vec![Interval::new(1, 2)]);
        entry.range_units = Some(RangeUnits::Microseconds);
        let before = entry.clone();
        migrate(&mut entry, RangeUnits::Milliseconds, &[]).unwrap();
        assert_eq!(entry, before);
    }

    #[test]
    fn test_row_index_migration_needs_a_timeline() {
        let mut entry = entry_with(vec![Interval::new(0, 1)]);
        assert_eq!(
            migrate(&mut entry, RangeUnits::RowIndex, &[]),
            Err(UnitsError::EmptyTimeline)
        );
    }
}
