//! Alignment and corpus statistics.
//!
//! # Components
//!
//! - [`interpolation`]: Evaluation of a sampled signal at arbitrary timestamps
//! - [`reference`]: Choice of the alignment reference series
//! - [`resampling`]: The alignment fold and its resampling strategies
//! - [`analysis`]: Sensor coverage and annotated duration statistics
//!
//! # Example
//!
//! ```
//! use flight_annotator::algorithms::{align_to_reference, ReferencePolicy, ResampleStrategy};
//! use flight_annotator::core::{Series, SourceId};
//!
//! let fast = Series::new(SourceId::new("imu", "ax"), (0..10).map(|i| i * 10).collect(), vec![1.0; 10]).unwrap();
//! let slow = Series::new(SourceId::new("gps", "alt"), vec![0, 45, 90], vec![5.0, 6.0, 7.0]).unwrap();
//! let series = vec![fast, slow];
//!
//! let reference = ReferencePolicy::Longest.select(&series).unwrap();
//! let aligned = align_to_reference(&series, reference, ResampleStrategy::Interpolate.resampler()).unwrap();
//! assert_eq!(aligned.row_count(), 10);
//! ```

pub mod analysis;
pub mod interpolation;
pub mod reference;
pub mod resampling;

pub use analysis::{
    family_is_present, format_duration, Denominator, DurationAccumulator, DurationAggregator,
    DurationReport, FamilyOverlap, FlightSummary,
};
pub use reference::ReferencePolicy;
pub use resampling::{
    align_step, align_to_reference, AlignedFlight, BlockAggregation, LinearInterpolation,
    ResampleStrategy, Resampler,
};
