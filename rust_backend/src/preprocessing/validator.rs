//! Minimum-length checks applied before and after alignment.
//!
//! A flight is not worth annotating when its sparsest series holds only a
//! handful of samples, or when the aligned table is too short to plot
//! meaningfully. Such flights are skipped with a [`SkipReason`], not
//! treated as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AlignmentSettings;
use crate::core::domain::{Series, SourceId};

/// Why a flight produced no table.
///
/// # Examples
///
/// ```
/// use flight_annotator::preprocessing::validator::SkipReason;
///
/// let reason = SkipReason::TooFewRows { rows: 42, minimum: 100 };
/// assert_eq!(reason.to_string(), "aligned table has 42 rows, minimum is 100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    NoSeries,
    TooFewSamples {
        source_id: SourceId,
        samples: usize,
        minimum: usize,
    },
    TooFewRows {
        rows: usize,
        minimum: usize,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoSeries => write!(f, "no catalog series found in the log"),
            SkipReason::TooFewSamples {
                source_id,
                samples,
                minimum,
            } => write!(
                f,
                "series {} has {} samples, minimum is {}",
                source_id, samples, minimum
            ),
            SkipReason::TooFewRows { rows, minimum } => {
                write!(f, "aligned table has {} rows, minimum is {}", rows, minimum)
            }
        }
    }
}

/// Threshold checks for one flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightValidator {
    pub min_samples: usize,
    pub min_rows: usize,
}

impl Default for FlightValidator {
    fn default() -> Self {
        Self::from_settings(&AlignmentSettings::default())
    }
}

impl FlightValidator {
    pub fn from_settings(settings: &AlignmentSettings) -> Self {
        Self {
            min_samples: settings.min_samples,
            min_rows: settings.min_rows,
        }
    }

    /// Check raw series before alignment. Reports the sparsest series when
    /// it is under the sample threshold (the first one on ties).
    pub fn check_series(&self, series: &[Series]) -> Option<SkipReason> {
        let mut sparsest: Option<&Series> = None;
        for s in series {
            if sparsest.map_or(true, |current| s.len() < current.len()) {
                sparsest = Some(s);
            }
        }
        let sparsest = match sparsest {
            Some(s) => s,
            None => return Some(SkipReason::NoSeries),
        };
        if sparsest.len() < self.min_samples {
            return Some(SkipReason::TooFewSamples {
                source_id: sparsest.source_id().clone(),
                samples: sparsest.len(),
                minimum: self.min_samples,
            });
        }
        None
    }

    /// Check the row count of an aligned table.
    pub fn check_rows(&self, rows: usize) -> Option<SkipReason> {
        if rows < self.min_rows {
            Some(SkipReason::TooFewRows {
                rows,
                minimum: self.min_rows,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, len: usize) -> Series {
        Series::new(
            SourceId::new("topic", name),
            (0..len as i64).collect(),
            vec![1.0; len],
        )
        .unwrap()
    }

    #[test]
    fn test_no_series() {
        assert_eq!(
            FlightValidator::default().check_series(&[]),
            Some(SkipReason::NoSeries)
        );
    }

    #[test]
    fn test_sparse_series_is_reported() {
        let validator = FlightValidator::default();
        let reason = validator
            .check_series(&[series("a", 100), series("b", 15), series("c", 15)])
            .unwrap();
        assert_eq!(
            reason,
            SkipReason::TooFewSamples {
                source_id: SourceId::new("topic", "b"),
                samples: 15,
                minimum: 20,
            }
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let validator = FlightValidator::default();
        assert_eq!(validator.check_series(&[series("a", 20)]), None);
        assert_eq!(validator.check_rows(100), None);
        assert_eq!(
            validator.check_rows(99),
            Some(SkipReason::TooFewRows {
                rows: 99,
                minimum: 100
            })
        );
    }
}
