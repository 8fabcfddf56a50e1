//! Projection of a flight's series onto one shared timeline.
//!
//! Alignment is a left fold over the series in their original order. Each
//! step receives the current reference axis and one series, projects the
//! series onto the axis and hands the axis to the next step. A series denser
//! than the axis is downsampled, any other series (the reference itself
//! included) is upsampled; the [`Resampler`] decides what those two
//! operations mean.

use serde::{Deserialize, Serialize};

use super::interpolation;
use crate::core::domain::Series;

/// A pair of projection rules used by the alignment fold.
pub trait Resampler {
    /// Project a series with more samples than `axis` onto `axis`.
    fn downsample(&self, series: &Series, axis: &[i64]) -> Vec<f64>;

    /// Project a series with at most as many samples as `axis` onto `axis`.
    fn upsample(&self, series: &Series, axis: &[i64]) -> Vec<f64>;
}

/// Continuous signals: piecewise-linear interpolation in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolation;

impl Resampler for LinearInterpolation {
    fn downsample(&self, series: &Series, axis: &[i64]) -> Vec<f64> {
        interpolation::linear(axis, series.timestamps(), series.values())
    }

    fn upsample(&self, series: &Series, axis: &[i64]) -> Vec<f64> {
        interpolation::linear(axis, series.timestamps(), series.values())
    }
}

/// Discrete/state signals: block means when downsampling, previous-value
/// hold when upsampling (zero-order hold).
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockAggregation;

impl Resampler for BlockAggregation {
    fn downsample(&self, series: &Series, axis: &[i64]) -> Vec<f64> {
        interpolation::bucket_mean(axis, series.timestamps(), series.values())
    }

    fn upsample(&self, series: &Series, axis: &[i64]) -> Vec<f64> {
        interpolation::hold(axis, series.timestamps(), series.values())
    }
}

/// Resampling strategy for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResampleStrategy {
    #[default]
    Interpolate,
    BlockAggregate,
}

impl ResampleStrategy {
    pub fn resampler(&self) -> &'static dyn Resampler {
        match self {
            ResampleStrategy::Interpolate => &LinearInterpolation,
            ResampleStrategy::BlockAggregate => &BlockAggregation,
        }
    }
}

/// Series of one flight sharing a single timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedFlight {
    pub reference_index: usize,
    pub axis: Vec<i64>,
    pub series: Vec<Series>,
}

impl AlignedFlight {
    pub fn row_count(&self) -> usize {
        self.axis.len()
    }
}

/// One fold step: project `series` onto `axis` and return the axis for the
/// next step together with the projected series.
pub fn align_step(
    axis: Vec<i64>,
    series: &Series,
    resampler: &dyn Resampler,
) -> (Vec<i64>, Series) {
    let values = if series.len() > axis.len() {
        resampler.downsample(series, &axis)
    } else {
        resampler.upsample(series, &axis)
    };
    let projected = series.with_axis(axis.clone(), values);
    (axis, projected)
}

/// Align every series onto the timeline of `series[reference_index]`.
///
/// Returns `None` when the index is out of range.
pub fn align_to_reference(
    series: &[Series],
    reference_index: usize,
    resampler: &dyn Resampler,
) -> Option<AlignedFlight> {
    let initial_axis = series.get(reference_index)?.timestamps().to_vec();

    let (axis, aligned) = series.iter().fold(
        (initial_axis, Vec::with_capacity(series.len())),
        |(axis, mut aligned), s| {
            let (axis, projected) = align_step(axis, s, resampler);
            aligned.push(projected);
            (axis, aligned)
        },
    );

    Some(AlignedFlight {
        reference_index,
        axis,
        series: aligned,
    })
}
