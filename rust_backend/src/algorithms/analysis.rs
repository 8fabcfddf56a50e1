use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::annotations::model::{AnnotationRecord, AnomalyClass};
use crate::core::catalog::SensorFamily;
use crate::parsing::ledger_parser::LedgerData;

const MICROS_PER_SECOND: f64 = 1e6;

/// Per-flight facts the corpus statistics are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub flight_id: String,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
    /// Names of the sensor families with non-trivial data in this flight.
    pub families: BTreeSet<String>,
}

impl FlightSummary {
    pub fn duration_seconds(&self) -> f64 {
        (self.last_timestamp - self.first_timestamp) as f64 / MICROS_PER_SECOND
    }

    pub fn has_family(&self, name: &str) -> bool {
        self.families.contains(name)
    }

    /// Summarize an aligned flight table.
    ///
    /// # Arguments
    /// * `flight_id` - Ledger key of the flight
    /// * `df` - Aligned table with a `timestamp` column
    /// * `families` - Families to test for presence
    ///
    /// # Returns
    /// `None` for a table without rows
    pub fn from_table(
        flight_id: &str,
        df: &DataFrame,
        families: &[SensorFamily],
    ) -> Result<Option<Self>, PolarsError> {
        if df.height() == 0 {
            return Ok(None);
        }

        let timestamps = df.column("timestamp")?.cast(&DataType::Float64)?;
        let timestamps = timestamps.f64()?;
        let (first, last) = match (timestamps.get(0), timestamps.get(df.height() - 1)) {
            (Some(first), Some(last)) => (first.round() as i64, last.round() as i64),
            _ => return Ok(None),
        };

        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut present = BTreeSet::new();
        for family in families {
            let mut cells: Vec<Option<f64>> = Vec::new();
            for name in column_names.iter().filter(|n| family.matches(n)) {
                let values = df.column(name)?.cast(&DataType::Float64)?;
                cells.extend(values.f64()?.into_iter());
            }
            if family_is_present(&cells) {
                present.insert(family.name.clone());
            }
        }

        Ok(Some(Self {
            flight_id: flight_id.to_string(),
            first_timestamp: first,
            last_timestamp: last,
            families: present,
        }))
    }
}

/// A family counts as present when its columns hold at least one cell, not
/// every cell is null/NaN, and not every cell is exactly zero.
pub fn family_is_present(cells: &[Option<f64>]) -> bool {
    if cells.is_empty() {
        return false;
    }
    let all_missing = cells.iter().all(|c| c.map_or(true, f64::is_nan));
    let all_zero = cells.iter().all(|c| *c == Some(0.0));
    !all_missing && !all_zero
}

/// Reference total for class percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denominator {
    /// Total duration of the flights that have a ledger entry.
    AnnotatedFlightTotal,
    /// Sum of per-class annotated durations.
    ClassTotal,
}

/// Overlap between two sensor families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyOverlap {
    pub first: String,
    pub second: String,
    pub seconds: f64,
}

/// Running totals, fed one flight and one record at a time.
#[derive(Debug, Clone, Default)]
pub struct DurationAccumulator {
    family_order: Vec<String>,
    flights: usize,
    annotated_flights: usize,
    total_seconds: f64,
    annotated_total_seconds: f64,
    family_seconds: BTreeMap<String, f64>,
    annotated_family_seconds: BTreeMap<String, f64>,
    overlap_seconds: BTreeMap<(usize, usize), f64>,
    class_seconds: BTreeMap<AnomalyClass, f64>,
    full_file_class_seconds: BTreeMap<AnomalyClass, f64>,
    covered_seconds: f64,
    untagged_flights: Vec<String>,
}

impl DurationAccumulator {
    pub fn new(families: &[SensorFamily]) -> Self {
        Self {
            family_order: families.iter().map(|f| f.name.clone()).collect(),
            ..Self::default()
        }
    }

    /// Count one flight's duration toward the totals, the families present
    /// in it and each pair of co-present families.
    pub fn add_flight(&mut self, summary: &FlightSummary, annotated: bool) {
        let duration = summary.duration_seconds();
        self.flights += 1;
        self.total_seconds += duration;
        if annotated {
            self.annotated_flights += 1;
            self.annotated_total_seconds += duration;
        }

        for (i, name) in self.family_order.iter().enumerate() {
            if !summary.has_family(name) {
                continue;
            }
            *self.family_seconds.entry(name.clone()).or_insert(0.0) += duration;
            if annotated {
                *self.annotated_family_seconds.entry(name.clone()).or_insert(0.0) += duration;
            }
            for (j, other) in self.family_order.iter().enumerate().skip(i + 1) {
                if summary.has_family(other) {
                    *self.overlap_seconds.entry((i, j)).or_insert(0.0) += duration;
                }
            }
        }
    }

    /// Count a record's marked time toward its class, every channel
    /// separately, and its cross-channel union toward the coverage total.
    pub fn add_record(&mut self, record: &AnnotationRecord) {
        let marked = record.marked_length() as f64 / MICROS_PER_SECOND;
        *self.class_seconds.entry(record.class_label).or_insert(0.0) += marked;
        self.covered_seconds += record.covered_length() as f64 / MICROS_PER_SECOND;
    }

    /// Count the whole flight once for each of its records.
    pub fn add_full_file(&mut self, summary: &FlightSummary, records: &[AnnotationRecord]) {
        let duration = summary.duration_seconds();
        for record in records {
            *self
                .full_file_class_seconds
                .entry(record.class_label)
                .or_insert(0.0) += duration;
        }
    }

    /// Note a ledger entry left out of every total because its ranges are
    /// in an unknown unit.
    pub fn add_untagged(&mut self, flight_id: &str) {
        self.untagged_flights.push(flight_id.to_string());
    }

    pub fn finish(self) -> DurationReport {
        let overlaps = self
            .overlap_seconds
            .iter()
            .map(|(&(i, j), &seconds)| FamilyOverlap {
                first: self.family_order[i].clone(),
                second: self.family_order[j].clone(),
                seconds,
            })
            .collect();

        DurationReport {
            families: self.family_order,
            flights: self.flights,
            annotated_flights: self.annotated_flights,
            total_seconds: self.total_seconds,
            annotated_total_seconds: self.annotated_total_seconds,
            family_seconds: self.family_seconds,
            annotated_family_seconds: self.annotated_family_seconds,
            overlaps,
            class_seconds: self.class_seconds,
            full_file_class_seconds: self.full_file_class_seconds,
            covered_seconds: self.covered_seconds,
            untagged_flights: self.untagged_flights,
        }
    }
}

/// Corpus-wide duration statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationReport {
    pub families: Vec<String>,
    pub flights: usize,
    pub annotated_flights: usize,
    pub total_seconds: f64,
    pub annotated_total_seconds: f64,
    pub family_seconds: BTreeMap<String, f64>,
    pub annotated_family_seconds: BTreeMap<String, f64>,
    pub overlaps: Vec<FamilyOverlap>,
    pub class_seconds: BTreeMap<AnomalyClass, f64>,
    pub full_file_class_seconds: BTreeMap<AnomalyClass, f64>,
    /// Per-record union of marked time across channels, summed.
    pub covered_seconds: f64,
    /// Ledger flights whose entries carry no range units. They count
    /// nowhere else in the report until migrated.
    pub untagged_flights: Vec<String>,
}

impl DurationReport {
    pub fn class_total_seconds(&self) -> f64 {
        self.class_seconds.values().sum()
    }

    pub fn family_seconds(&self, family: &str) -> f64 {
        self.family_seconds.get(family).copied().unwrap_or(0.0)
    }

    pub fn class_seconds(&self, class_label: AnomalyClass) -> f64 {
        self.class_seconds.get(&class_label).copied().unwrap_or(0.0)
    }

    pub fn overlap_seconds(&self, first: &str, second: &str) -> f64 {
        self.overlaps
            .iter()
            .find(|o| {
                (o.first == first && o.second == second) || (o.first == second && o.second == first)
            })
            .map_or(0.0, |o| o.seconds)
    }

    /// Share of `class_label` in the chosen total, `None` when that total is
    /// zero.
    pub fn class_share(&self, class_label: AnomalyClass, denominator: Denominator) -> Option<f64> {
        let total = match denominator {
            Denominator::AnnotatedFlightTotal => self.annotated_total_seconds,
            Denominator::ClassTotal => self.class_total_seconds(),
        };
        if total > 0.0 {
            Some(self.class_seconds(class_label) / total)
        } else {
            None
        }
    }
}

fn format_share(share: Option<f64>) -> String {
    share.map_or_else(|| "n/a".to_string(), |s| format!("{:.2}%", s * 100.0))
}

impl fmt::Display for DurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Flights: {} ({} annotated)",
            self.flights, self.annotated_flights
        )?;
        if !self.untagged_flights.is_empty() {
            writeln!(
                f,
                "Excluded ledger entries without range units: {} (run flight-migrate)",
                self.untagged_flights.len()
            )?;
        }
        writeln!(f, "Total flight duration: {}", format_duration(self.total_seconds))?;
        writeln!(
            f,
            "Total annotated flight duration: {}",
            format_duration(self.annotated_total_seconds)
        )?;

        writeln!(f, "\nSensor coverage:")?;
        for family in &self.families {
            let annotated = self.annotated_family_seconds.get(family).copied().unwrap_or(0.0);
            writeln!(
                f,
                "  {}: {} (annotated flights: {})",
                family,
                format_duration(self.family_seconds(family)),
                format_duration(annotated)
            )?;
        }
        for overlap in &self.overlaps {
            writeln!(
                f,
                "  {} & {}: {}",
                overlap.first,
                overlap.second,
                format_duration(overlap.seconds)
            )?;
        }

        writeln!(f, "\nAnnotated duration per class:")?;
        for (class_label, seconds) in &self.class_seconds {
            writeln!(
                f,
                "  {}: {} ({} of annotated flight time, {} of annotated time)",
                class_label,
                format_duration(*seconds),
                format_share(self.class_share(*class_label, Denominator::AnnotatedFlightTotal)),
                format_share(self.class_share(*class_label, Denominator::ClassTotal)),
            )?;
        }
        writeln!(
            f,
            "  Annotated coverage (channels merged): {}",
            format_duration(self.covered_seconds)
        )?;

        writeln!(f, "\nFull-file duration per class:")?;
        for (class_label, seconds) in &self.full_file_class_seconds {
            writeln!(f, "  {}: {}", class_label, format_duration(*seconds))?;
        }
        Ok(())
    }
}

/// Builds a [`DurationReport`] from flight summaries and a ledger snapshot.
#[derive(Debug, Clone)]
pub struct DurationAggregator {
    families: Vec<SensorFamily>,
}

impl DurationAggregator {
    pub fn new(families: Vec<SensorFamily>) -> Self {
        Self { families }
    }

    /// Per-class durations cover every ledger record, including flights with
    /// no summary; full-file durations only cover flights with one.
    ///
    /// Entries without range units are not read as microseconds. Their
    /// flights count as unannotated and are listed in
    /// [`DurationReport::untagged_flights`] instead.
    pub fn aggregate(&self, flights: &[FlightSummary], ledger: &LedgerData) -> DurationReport {
        let mut acc = DurationAccumulator::new(&self.families);

        for summary in flights {
            let entry = ledger
                .get(&summary.flight_id)
                .filter(|entry| entry.is_canonical());
            acc.add_flight(summary, entry.is_some());
            if let Some(entry) = entry {
                acc.add_full_file(summary, &entry.annotations);
            }
        }

        for (flight_id, entry) in ledger {
            if !entry.is_canonical() {
                acc.add_untagged(flight_id);
                continue;
            }
            for record in &entry.annotations {
                acc.add_record(record);
            }
        }

        acc.finish()
    }
}

/// Seconds as `"{h}h {m}m {s}s"`, truncating fractional seconds.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::model::{AnnotationRange, FlightEntry, Interval};
    use crate::core::catalog::default_sensor_families;

    fn summary(id: &str, seconds: i64, families: &[&str]) -> FlightSummary {
        FlightSummary {
            flight_id: id.to_string(),
            first_timestamp: 1_000_000,
            last_timestamp: 1_000_000 + seconds * 1_000_000,
            families: families.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn record(class_label: AnomalyClass, ranges: Vec<(&str, i64, i64)>) -> AnnotationRecord {
        AnnotationRecord::new(
            class_label,
            "",
            ranges
                .into_iter()
                .map(|(channel, s, e)| AnnotationRange::new(channel, vec![Interval::new(s, e)]))
                .collect(),
        )
    }

    fn ledger_with(flight_id: &str, records: Vec<AnnotationRecord>) -> LedgerData {
        let mut data = LedgerData::new();
        data.insert(
            flight_id.to_string(),
            FlightEntry {
                annotations: records,
                ..FlightEntry::new_canonical()
            },
        );
        data
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0h 0m 0s");
        assert_eq!(format_duration(3_725.9), "1h 2m 5s");
        assert_eq!(format_duration(-4.0), "0h 0m 0s");
        assert_eq!(format_duration(f64::NAN), "0h 0m 0s");
    }

    #[test]
    fn test_family_presence_rules() {
        assert!(!family_is_present(&[]));
        assert!(!family_is_present(&[None, Some(f64::NAN)]));
        assert!(!family_is_present(&[Some(0.0), Some(0.0)]));
        assert!(family_is_present(&[Some(0.0), Some(1.5)]));
        assert!(family_is_present(&[Some(0.0), None]));
    }

    #[test]
    fn test_two_mechanical_records_count_twice() {
        let flights = vec![summary("f1", 120, &[])];
        let ledger = ledger_with(
            "f1",
            vec![
                record(AnomalyClass::Mechanical, vec![("Attitude.Roll", 0, 10_000_000)]),
                record(AnomalyClass::Mechanical, vec![("Attitude.Roll", 20_000_000, 30_000_000)]),
            ],
        );

        let report = DurationAggregator::new(default_sensor_families()).aggregate(&flights, &ledger);
        assert_eq!(report.class_seconds(AnomalyClass::Mechanical), 20.0);
        assert_eq!(
            report.full_file_class_seconds[&AnomalyClass::Mechanical],
            240.0
        );
        assert_eq!(report.covered_seconds, 20.0);
    }

    #[test]
    fn test_cross_channel_window_is_doubled_but_covered_once() {
        let ledger = ledger_with(
            "f1",
            vec![record(
                AnomalyClass::Heading,
                vec![("Attitude.Yaw", 0, 5_000_000), ("Magnetometer", 0, 5_000_000)],
            )],
        );
        let report = DurationAggregator::new(Vec::new()).aggregate(&[], &ledger);

        assert_eq!(report.class_seconds(AnomalyClass::Heading), 10.0);
        assert_eq!(report.covered_seconds, 5.0);
        assert!(report.class_total_seconds() > report.covered_seconds);
        // no summary for f1, so no full-file time either
        assert!(report.full_file_class_seconds.is_empty());
    }

    #[test]
    fn test_family_coverage_and_overlap() {
        let flights = vec![
            summary("a", 100, &["vision_position", "gps_position"]),
            summary("b", 50, &["gps_position"]),
            summary("c", 10, &[]),
        ];
        let ledger = ledger_with("b", Vec::new());
        let report = DurationAggregator::new(default_sensor_families()).aggregate(&flights, &ledger);

        assert_eq!(report.flights, 3);
        assert_eq!(report.annotated_flights, 1);
        assert_eq!(report.total_seconds, 160.0);
        assert_eq!(report.annotated_total_seconds, 50.0);
        assert_eq!(report.family_seconds("gps_position"), 150.0);
        assert_eq!(report.family_seconds("vision_position"), 100.0);
        assert_eq!(report.family_seconds("visual_odometry"), 0.0);
        assert_eq!(report.annotated_family_seconds["gps_position"], 50.0);
        assert_eq!(report.overlap_seconds("gps_position", "vision_position"), 100.0);
        assert_eq!(report.overlaps.len(), 1);
    }

    #[test]
    fn test_untagged_entry_is_left_out_of_totals() {
        let flights = vec![summary("legacy", 100, &["gps_position"]), summary("f1", 50, &[])];
        let mut ledger = ledger_with(
            "f1",
            vec![record(AnomalyClass::Altitude, vec![("Altitude", 0, 4_000_000)])],
        );
        ledger.insert(
            "legacy".to_string(),
            FlightEntry {
                annotations: vec![record(AnomalyClass::Altitude, vec![("Altitude", 2, 80)])],
                range_units: None,
            },
        );

        let report = DurationAggregator::new(default_sensor_families()).aggregate(&flights, &ledger);
        assert_eq!(report.untagged_flights, vec!["legacy".to_string()]);
        assert_eq!(report.flights, 2);
        assert_eq!(report.annotated_flights, 1);
        assert_eq!(report.annotated_total_seconds, 50.0);
        assert_eq!(report.class_seconds(AnomalyClass::Altitude), 4.0);
        assert_eq!(report.full_file_class_seconds[&AnomalyClass::Altitude], 50.0);
        assert!(report
            .to_string()
            .contains("Excluded ledger entries without range units: 1"));
    }

    #[test]
    fn test_class_share_denominators() {
        let flights = vec![summary("f1", 100, &[])];
        let ledger = ledger_with(
            "f1",
            vec![
                record(AnomalyClass::Altitude, vec![("Altitude", 0, 10_000_000)]),
                record(AnomalyClass::Electrical, vec![("Battery", 0, 30_000_000)]),
            ],
        );
        let report = DurationAggregator::new(Vec::new()).aggregate(&flights, &ledger);

        let by_flight = report
            .class_share(AnomalyClass::Altitude, Denominator::AnnotatedFlightTotal)
            .unwrap();
        let by_class = report
            .class_share(AnomalyClass::Altitude, Denominator::ClassTotal)
            .unwrap();
        assert!((by_flight - 0.10).abs() < 1e-12);
        assert!((by_class - 0.25).abs() < 1e-12);

        let empty = DurationAggregator::new(Vec::new()).aggregate(&[], &LedgerData::new());
        assert_eq!(empty.class_share(AnomalyClass::Altitude, Denominator::ClassTotal), None);
    }

    #[test]
    fn test_summary_from_table() {
        let df = df!(
            "timestamp" => &[1_000_000.0f64, 2_000_000.0, 4_500_000.0],
            "vehicle_gps_position.lat" => &[0.0f64, 0.0, 0.0],
            "vehicle_global_position.alt" => &[f64::NAN, 12.0, 13.0],
            "vehicle_visual_odometry.x" => &[f64::NAN, f64::NAN, f64::NAN]
        )
        .unwrap();

        let summary = FlightSummary::from_table("log_1", &df, &default_sensor_families())
            .unwrap()
            .unwrap();
        assert_eq!(summary.duration_seconds(), 3.5);
        let families: Vec<&str> = summary.families.iter().map(|s| s.as_str()).collect();
        assert_eq!(families, vec!["global_position"]);
    }

    #[test]
    fn test_summary_of_empty_table_is_none() {
        let df = df!("timestamp" => Vec::<f64>::new()).unwrap();
        assert!(FlightSummary::from_table("x", &df, &[]).unwrap().is_none());
    }

    #[test]
    fn test_report_renders() {
        let flights = vec![summary("f1", 3_700, &["gps_position"])];
        let ledger = ledger_with(
            "f1",
            vec![record(AnomalyClass::Mechanical, vec![("Attitude.Roll", 0, 61_000_000)])],
        );
        let text = DurationAggregator::new(default_sensor_families())
            .aggregate(&flights, &ledger)
            .to_string();
        assert!(text.contains("Total flight duration: 1h 1m 40s"));
        assert!(text.contains("Mechanical: 0h 1m 1s"));
    }
}
