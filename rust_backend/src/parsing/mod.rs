//! Parsers for flight data formats.
//!
//! # Parsers
//!
//! - [`topic_parser`]: Decoded flight log dumps (one JSON document per flight)
//! - [`csv_parser`]: Aligned flight tables
//! - [`ledger_parser`]: The annotation ledger document
//!
//! # Example
//!
//! ```no_run
//! use flight_annotator::core::TopicCatalog;
//! use flight_annotator::parsing::topic_parser::{extract_series, parse_topic_dump};
//! use std::path::Path;
//!
//! let dump = parse_topic_dump(Path::new("log_12.json")).expect("Failed to parse dump");
//! let series = extract_series(&dump, &TopicCatalog::default()).expect("Malformed series");
//! println!("Extracted {} series", series.len());
//! ```

pub mod csv_parser;
pub mod ledger_parser;
pub mod topic_parser;

#[cfg(test)]
mod csv_parser_tests;
#[cfg(test)]
mod ledger_parser_tests;

pub use ledger_parser::LedgerData;
pub use topic_parser::{TopicData, TopicDump, TopicSource};
