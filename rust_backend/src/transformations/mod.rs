//! Table transformations applied after alignment.
//!
//! # Modules
//!
//! - [`annotation`]: Burn ledger annotations into a flight table and read
//!   them back as row runs

pub mod annotation;

pub use annotation::{anomaly_runs, burn_in, ANOMALY_CLASS_COLUMN, ANOMALY_COLUMN};
