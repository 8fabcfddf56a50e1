//! Pipeline configuration file support.
//!
//! Every setting has a default, so an empty file (or no file at all) yields
//! the standard PX4 preprocessing setup.
//!
//! ```toml
//! [alignment]
//! min_samples = 20
//! min_rows = 100
//! reference_policy = "median_closest"   # or "longest"
//! resample_strategy = "interpolate"     # or "block_aggregate"
//!
//! [[statistics.sensor_families]]
//! name = "gps_position"
//! column_pattern = "vehicle_gps_position"
//!
//! # Optional: replaces the built-in topic catalog
//! [[topics]]
//! dataset = "vehicle_attitude"
//! attributes = ["roll", "pitch", "yaw"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithms::reference::ReferencePolicy;
use crate::algorithms::resampling::ResampleStrategy;
use crate::core::catalog::{default_sensor_families, SensorFamily, TopicCatalog};

pub const CONFIG_FILE_NAME: &str = "flight_annotator.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No {0} found in standard locations")]
    NotFound(String),
}

/// Alignment and minimum-length settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSettings {
    /// Flights whose sparsest series has fewer raw samples are skipped.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Flights whose aligned table has fewer rows are skipped.
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,
    #[serde(default)]
    pub reference_policy: ReferencePolicy,
    #[serde(default)]
    pub resample_strategy: ResampleStrategy,
}

fn default_min_samples() -> usize {
    20
}

fn default_min_rows() -> usize {
    100
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            min_rows: default_min_rows(),
            reference_policy: ReferencePolicy::default(),
            resample_strategy: ResampleStrategy::default(),
        }
    }
}

/// Corpus statistics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSettings {
    #[serde(default = "default_sensor_families")]
    pub sensor_families: Vec<SensorFamily>,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            sensor_families: default_sensor_families(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub alignment: AlignmentSettings,
    #[serde(default)]
    pub statistics: StatisticsSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<TopicCatalog>,
}

impl PipelineConfig {
    /// Parse and validate a configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load pipeline configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(PipelineConfig)` if successful
    /// * `Err(ConfigError)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load pipeline configuration from the default location.
    ///
    /// Searches for `flight_annotator.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = vec![
            PathBuf::from(CONFIG_FILE_NAME),
            PathBuf::from("rust_backend").join(CONFIG_FILE_NAME),
            PathBuf::from("..").join(CONFIG_FILE_NAME),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Using configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound(CONFIG_FILE_NAME.to_string()))
    }

    /// Explicit path if given, else the default location, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::from_default_location() {
                Err(ConfigError::NotFound(_)) => {
                    log::info!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
                other => other,
            },
        }
    }

    /// Topic catalog in effect: the configured one, or the built-in list.
    pub fn catalog(&self) -> TopicCatalog {
        self.topics.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alignment.min_samples == 0 {
            return Err(ConfigError::Invalid(
                "'alignment.min_samples' must be at least 1".to_string(),
            ));
        }
        if self.alignment.min_rows == 0 {
            return Err(ConfigError::Invalid(
                "'alignment.min_rows' must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for family in &self.statistics.sensor_families {
            if family.column_pattern.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Sensor family '{}' has an empty column_pattern",
                    family.name
                )));
            }
            if !seen.insert(family.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Sensor family '{}' is defined twice",
                    family.name
                )));
            }
        }

        if let Some(topics) = &self.topics {
            if topics.is_empty() {
                return Err(ConfigError::Invalid(
                    "'topics' is present but lists no dataset".to_string(),
                ));
            }
        }
        Ok(())
    }
}
