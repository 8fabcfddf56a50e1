//! Flight telemetry alignment and anomaly annotation toolkit.
//!
//! Decoded PX4 flight logs are aligned onto one shared timeline and written
//! as CSV tables; labeled anomaly windows live in a JSON ledger; corpus
//! statistics combine both.
//!
//! # Modules
//!
//! - [`core`]: Series, source ids, the topic catalog and sensor families
//! - [`algorithms`]: Reference selection, resampling, duration statistics
//! - [`annotations`]: Annotation records, the ledger and its stores
//! - [`parsing`]: Topic dumps, aligned CSV tables, ledger documents
//! - [`preprocessing`]: Validation, table assembly and the batch pipeline
//! - [`transformations`]: Burning annotations into tables
//! - [`io`]: File discovery and loaders
//! - [`config`]: TOML pipeline configuration

pub mod algorithms;
pub mod annotations;
pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod transformations;
