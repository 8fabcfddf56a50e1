//! Core domain models for flight telemetry.
//!
//! This module defines the data structures shared by the alignment engine and
//! the statistics: decoded series and the topic/sensor catalog.

pub mod catalog;
pub mod domain;

pub use catalog::{SensorFamily, TopicCatalog, TopicSelection};
pub use domain::{Series, SeriesError, SourceId};
