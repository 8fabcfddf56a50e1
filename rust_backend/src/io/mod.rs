//! High-level data loading utilities.
//!
//! Loaders combine the parsers with file discovery and error context, and
//! derive ledger flight ids from file paths.
//!
//! # Example
//!
//! ```no_run
//! use flight_annotator::core::catalog::default_sensor_families;
//! use flight_annotator::io::loaders::FlightLoader;
//! use std::path::Path;
//!
//! let summaries = FlightLoader::load_summaries(Path::new("csv"), &default_sensor_families())
//!     .expect("Failed to load");
//! println!("Loaded {} flights", summaries.len());
//! ```

pub mod loaders;


pub use loaders::{discover_files, flight_id_for, FlightLoader, MigrationSummary};
