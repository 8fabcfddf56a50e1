//! Topic selection and sensor family definitions.
//!
//! The catalog lists, in column order, which attributes are extracted from
//! each log dataset. Sensor families group columns by dataset name and drive
//! the presence statistics in [`crate::algorithms::analysis`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Attributes to extract from one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSelection {
    pub dataset: String,
    pub attributes: Vec<String>,
}

impl TopicSelection {
    pub fn new(dataset: &str, attributes: &[&str]) -> Self {
        Self {
            dataset: dataset.to_string(),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered dataset → attributes selection.
///
/// A dataset listed twice keeps its first position but takes the later
/// attribute list. Repeated attributes within a list are dropped, so every
/// resulting column name is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TopicSelection>", into = "Vec<TopicSelection>")]
pub struct TopicCatalog {
    topics: Vec<TopicSelection>,
}

impl TopicCatalog {
    pub fn new(entries: Vec<TopicSelection>) -> Self {
        let mut topics: Vec<TopicSelection> = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut attributes: Vec<String> = Vec::with_capacity(entry.attributes.len());
            for attribute in entry.attributes {
                if !attributes.contains(&attribute) {
                    attributes.push(attribute);
                }
            }
            match topics.iter_mut().find(|t| t.dataset == entry.dataset) {
                Some(existing) => existing.attributes = attributes,
                None => topics.push(TopicSelection {
                    dataset: entry.dataset,
                    attributes,
                }),
            }
        }
        Self { topics }
    }

    pub fn topics(&self) -> &[TopicSelection] {
        &self.topics
    }

    pub fn datasets(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.dataset.as_str())
    }

    /// Total number of (dataset, attribute) pairs.
    pub fn column_count(&self) -> usize {
        self.topics.iter().map(|t| t.attributes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl From<Vec<TopicSelection>> for TopicCatalog {
    fn from(entries: Vec<TopicSelection>) -> Self {
        Self::new(entries)
    }
}

impl From<TopicCatalog> for Vec<TopicSelection> {
    fn from(catalog: TopicCatalog) -> Self {
        catalog.topics
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

/// Group of columns that share a physical sensor, matched by a substring of
/// the column name (normally the dataset name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorFamily {
    pub name: String,
    pub column_pattern: String,
}

impl SensorFamily {
    pub fn new(name: &str, column_pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            column_pattern: column_pattern.to_string(),
        }
    }

    pub fn matches(&self, column: &str) -> bool {
        column.contains(&self.column_pattern)
    }
}

/// Families reported by the corpus statistics.
pub fn default_sensor_families() -> Vec<SensorFamily> {
    vec![
        SensorFamily::new("vision_position", "vehicle_vision_position"),
        SensorFamily::new("global_position", "vehicle_global_position"),
        SensorFamily::new("gps_position", "vehicle_gps_position"),
        SensorFamily::new("visual_odometry", "vehicle_visual_odometry"),
    ]
}

/// PX4 topics extracted for anomaly annotation.
pub static DEFAULT_CATALOG: Lazy<TopicCatalog> = Lazy::new(|| {
    TopicCatalog::new(vec![
        TopicSelection::new(
            "vehicle_attitude",
            &[
                "roll", "pitch", "yaw", "roll_d", "pitch_d", "yaw_d", "rollspeed", "pitchspeed",
                "yawspeed",
            ],
        ),
        TopicSelection::new(
            "vehicle_attitude_setpoint",
            &[
                "roll_d", "pitch_d", "yaw_d", "roll_body", "pitch_body", "yaw_body", "q[0]",
                "q[1]", "q[2]", "q[3]",
            ],
        ),
        TopicSelection::new(
            "vehicle_local_position",
            &["x", "y", "z", "yaw", "vx", "vy", "vz", "ax", "ay", "az"],
        ),
        TopicSelection::new(
            "vehicle_local_position_setpoint",
            &["x", "y", "z", "yaw", "vx", "vy", "vz"],
        ),
        TopicSelection::new(
            "sensor_combined",
            &["magnetometer_ga[0]", "magnetometer_ga[1]", "magnetometer_ga[2]"],
        ),
        TopicSelection::new(
            "vehicle_magnetometer",
            &["magnetometer_ga[0]", "magnetometer_ga[1]", "magnetometer_ga[2]"],
        ),
        TopicSelection::new(
            "vehicle_air_data",
            &["baro_alt_meter", "baro_temp_celcius", "baro_pressure_pa", "rho"],
        ),
        TopicSelection::new(
            "gps_position",
            &[
                "alt",
                "eph",
                "epv",
                "satellites_used",
                "fix_type",
                "noise_per_ms",
                "jamming_indicator",
            ],
        ),
        TopicSelection::new("vehicle_global_position", &["alt", "lat", "lon"]),
        TopicSelection::new(
            "actuator_controls_0",
            &["thrust", "control[0]", "control[1]", "control[2]", "control[3]"],
        ),
        TopicSelection::new("distance_sensor", &["current_distance"]),
        TopicSelection::new(
            "actuator_outputs",
            &[
                "output[0]", "output[1]", "output[2]", "output[3]", "output[4]", "output[5]",
                "output[6]", "output[7]",
            ],
        ),
        TopicSelection::new("trajectory_setpoint", &["x", "y", "z", "yaw"]),
        TopicSelection::new(
            "vehicle_visual_odometry",
            &["x", "y", "z", "vx", "vy", "vz", "roll", "pitch", "yaw", "latency"],
        ),
        TopicSelection::new("rate_ctrl_status", &["rollspeed", "pitchspeed", "yawspeed"]),
        TopicSelection::new(
            "battery_status",
            &["voltage_v", "current_a", "discharged_mah", "remaining"],
        ),
        TopicSelection::new("vehicle_rates_setpoint", &["roll", "pitch", "yaw"]),
        TopicSelection::new("vehicle_angular_velocity", &["xyz[0]", "xyz[1]", "xyz[2]"]),
        TopicSelection::new(
            "vehicle_status",
            &["arming_state", "vehicle_type", "nav_state", "vehicle_land_detected"],
        ),
        TopicSelection::new("manual_control_setpoint", &["x", "y", "r", "z"]),
        TopicSelection::new("estimator_status", &["vibe[2]", "time_slip"]),
        TopicSelection::new(
            "vehicle_angular_acceleration",
            &["xyz[0]", "xyz[1]", "xyz[2]"],
        ),
        TopicSelection::new("input_rc", &["rssi", "rc_lost"]),
        TopicSelection::new("sensor_baro", &["temperature"]),
        TopicSelection::new("sensor_accel", &["temperature"]),
        TopicSelection::new("cpuload", &["load", "ram_usage"]),
        TopicSelection::new(
            "ekf2_innovations",
            &[
                "mag_innov",
                "mag_innov_var",
                "vel_innov",
                "vel_innov_var",
                "pos_innov",
                "pos_innov_var",
                "hagl_innov",
                "hagl_innov_var",
            ],
        ),
        TopicSelection::new("vehicle_gps_position", &["lat", "lon", "alt"]),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_duplicate_replaces_attributes_in_place() {
        let catalog = TopicCatalog::new(vec![
            TopicSelection::new("a", &["x", "y"]),
            TopicSelection::new("b", &["z"]),
            TopicSelection::new("a", &["w", "w", "y"]),
        ]);

        let datasets: Vec<&str> = catalog.datasets().collect();
        assert_eq!(datasets, vec!["a", "b"]);
        assert_eq!(catalog.topics()[0].attributes, vec!["w", "y"]);
        assert_eq!(catalog.column_count(), 3);
    }

    #[test]
    fn test_default_sensor_combined_extracts_magnetometer_only() {
        let catalog = TopicCatalog::default();
        let position = catalog
            .datasets()
            .position(|d| d == "sensor_combined")
            .unwrap();
        assert_eq!(position, 4);
        assert_eq!(
            catalog.topics()[position].attributes,
            vec!["magnetometer_ga[0]", "magnetometer_ga[1]", "magnetometer_ga[2]"]
        );
        assert_eq!(catalog.datasets().filter(|d| *d == "sensor_combined").count(), 1);
    }

    #[test]
    fn test_default_catalog_has_unique_columns() {
        let catalog = TopicCatalog::default();
        let mut names: Vec<String> = catalog
            .topics()
            .iter()
            .flat_map(|t| t.attributes.iter().map(move |a| format!("{}.{}", t.dataset, a)))
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(catalog.topics()[0].dataset, "vehicle_attitude");
    }

    #[test]
    fn test_sensor_family_matches_by_substring() {
        let family = SensorFamily::new("gps_position", "vehicle_gps_position");
        assert!(family.matches("vehicle_gps_position.lat"));
        assert!(!family.matches("gps_position.alt"));
    }
}
