//! Domain models for decoded flight telemetry.
//!
//! A flight log is decoded into one [`Series`] per (dataset, attribute) pair.
//! Every series carries its own, possibly irregular, microsecond timeline;
//! alignment onto a shared timeline happens in [`crate::algorithms::resampling`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error raised when a series violates its structural invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("Series {source_id}: {timestamps} timestamps but {values} values")]
    LengthMismatch {
        source_id: SourceId,
        timestamps: usize,
        values: usize,
    },

    #[error("Series {source_id}: timestamp at index {index} goes backwards")]
    NotMonotonic { source_id: SourceId, index: usize },
}

/// Identifies where a series came from: the log dataset (topic) and the
/// attribute (field) inside it.
///
/// Its display form, `"<dataset>.<attribute>"`, is the column name used in
/// aligned tables.
///
/// # Examples
///
/// ```
/// use flight_annotator::core::domain::SourceId;
///
/// let id = SourceId::new("vehicle_attitude", "roll");
/// assert_eq!(id.column_name(), "vehicle_attitude.roll");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId {
    pub dataset: String,
    pub attribute: String,
}

impl SourceId {
    pub fn new(dataset: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            attribute: attribute.into(),
        }
    }

    /// Column name of this source in an aligned table.
    pub fn column_name(&self) -> String {
        format!("{}.{}", self.dataset, self.attribute)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.attribute)
    }
}

/// One sensor attribute sampled over time.
///
/// `timestamps` are integer microsecond ticks and never decrease;
/// `values` has exactly one entry per timestamp. Both invariants are checked
/// by [`Series::new`], so every `Series` in circulation is well formed.
///
/// # Examples
///
/// ```
/// use flight_annotator::core::domain::{Series, SourceId};
///
/// let series = Series::new(
///     SourceId::new("battery_status", "voltage_v"),
///     vec![0, 1_000_000, 2_000_000],
///     vec![16.8, 16.7, 16.7],
/// )
/// .unwrap();
///
/// assert_eq!(series.len(), 3);
/// assert_eq!(series.span_micros(), 2_000_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    source_id: SourceId,
    timestamps: Vec<i64>,
    values: Vec<f64>,
}

impl Series {
    /// Build a series, validating length agreement and timestamp ordering.
    pub fn new(
        source_id: SourceId,
        timestamps: Vec<i64>,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if timestamps.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                source_id,
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }

        if let Some(index) = timestamps.windows(2).position(|w| w[1] < w[0]) {
            return Err(SeriesError::NotMonotonic {
                source_id,
                index: index + 1,
            });
        }

        Ok(Self {
            source_id,
            timestamps,
            values,
        })
    }

    /// Re-express this series on another timeline.
    ///
    /// Callers pass values computed for exactly the given timestamps, so the
    /// invariants carry over from the source axis.
    pub(crate) fn with_axis(&self, timestamps: Vec<i64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self {
            source_id: self.source_id.clone(),
            timestamps,
            values,
        }
    }

    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Time between first and last sample in microseconds, zero when empty.
    pub fn span_micros(&self) -> i64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    pub fn into_parts(self) -> (SourceId, Vec<i64>, Vec<f64>) {
        (self.source_id, self.timestamps, self.values)
    }
}
