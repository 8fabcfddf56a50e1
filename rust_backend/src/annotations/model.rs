//! Typed annotation records as stored in the ledger.
//!
//! A record is one "save" of the labeling UI: a class, a free-text note,
//! a creation time and one [`AnnotationRange`] per plot channel that
//! received at least one box.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::units::RangeUnits;

/// Anomaly classes offered by the labeling UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalyClass {
    Mechanical,
    Altitude,
    #[serde(rename = "External Position")]
    ExternalPosition,
    Heading,
    #[serde(rename = "Global Position")]
    GlobalPosition,
    Electrical,
}

impl AnomalyClass {
    pub const ALL: [AnomalyClass; 6] = [
        AnomalyClass::Mechanical,
        AnomalyClass::Altitude,
        AnomalyClass::ExternalPosition,
        AnomalyClass::Heading,
        AnomalyClass::GlobalPosition,
        AnomalyClass::Electrical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyClass::Mechanical => "Mechanical",
            AnomalyClass::Altitude => "Altitude",
            AnomalyClass::ExternalPosition => "External Position",
            AnomalyClass::Heading => "Heading",
            AnomalyClass::GlobalPosition => "Global Position",
            AnomalyClass::Electrical => "Electrical",
        }
    }
}

impl fmt::Display for AnomalyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnomalyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnomalyClass::ALL
            .iter()
            .copied()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = AnomalyClass::ALL.iter().map(|c| c.as_str()).collect();
                format!(
                    "Unknown anomaly class '{}'. Must be one of: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// Closed interval `[start, end]` in the ledger's range units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    /// `end - start`, saturating at the bounds of `i64`.
    pub fn length(&self) -> i64 {
        self.end.saturating_sub(self.start)
    }
}

/// Accepts integral JSON numbers as well as floats (rounded), as older UI
/// builds sent raw float pixel coordinates.
#[derive(Deserialize)]
#[serde(untagged)]
enum Endpoint {
    Int(i64),
    Float(f64),
}

// 2^63, the first float above i64::MAX
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl TryFrom<Endpoint> for i64 {
    type Error = String;

    fn try_from(endpoint: Endpoint) -> Result<Self, Self::Error> {
        match endpoint {
            Endpoint::Int(i) => Ok(i),
            Endpoint::Float(f) => {
                let rounded = f.round();
                if rounded.is_finite() && rounded >= -I64_LIMIT && rounded < I64_LIMIT {
                    Ok(rounded as i64)
                } else {
                    Err(format!("range endpoint {} is outside the 64-bit range", f))
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let (start, end) = <(Endpoint, Endpoint)>::deserialize(deserializer)?;
        Ok(Interval::new(
            i64::try_from(start).map_err(D::Error::custom)?,
            i64::try_from(end).map_err(D::Error::custom)?,
        ))
    }
}

impl Serialize for Interval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        [self.start, self.end].serialize(serializer)
    }
}

/// Boxes drawn on one channel (plot) during a save.
///
/// Persisted as `["<channel_id>", [[start, end], ...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, Vec<Interval>)", into = "(String, Vec<Interval>)")]
pub struct AnnotationRange {
    pub channel_id: String,
    pub intervals: Vec<Interval>,
}

impl AnnotationRange {
    pub fn new(channel_id: impl Into<String>, intervals: Vec<Interval>) -> Self {
        Self {
            channel_id: channel_id.into(),
            intervals,
        }
    }
}

impl From<(String, Vec<Interval>)> for AnnotationRange {
    fn from((channel_id, intervals): (String, Vec<Interval>)) -> Self {
        Self {
            channel_id,
            intervals,
        }
    }
}

impl From<AnnotationRange> for (String, Vec<Interval>) {
    fn from(range: AnnotationRange) -> Self {
        (range.channel_id, range.intervals)
    }
}

/// One labeled save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "class")]
    pub class_label: AnomalyClass,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "timestamp", with = "iso_timestamp")]
    pub created_at: DateTime<Utc>,
    pub ranges: Vec<AnnotationRange>,
}

impl AnnotationRecord {
    /// Record created now.
    pub fn new(class_label: AnomalyClass, note: impl Into<String>, ranges: Vec<AnnotationRange>) -> Self {
        Self {
            class_label,
            note: note.into(),
            created_at: Utc::now(),
            ranges,
        }
    }

    pub fn intervals(&self) -> impl Iterator<Item = (&str, &Interval)> {
        self.ranges
            .iter()
            .flat_map(|r| r.intervals.iter().map(move |i| (r.channel_id.as_str(), i)))
    }

    /// First reversed interval, with its channel.
    pub fn first_reversed(&self) -> Option<(&str, Interval)> {
        self.intervals()
            .find(|(_, interval)| interval.is_reversed())
            .map(|(channel, interval)| (channel, *interval))
    }

    /// Sum of interval lengths over every channel. A window marked on two
    /// channels counts twice.
    pub fn marked_length(&self) -> i64 {
        self.intervals()
            .fold(0i64, |total, (_, i)| total.saturating_add(i.length()))
    }

    /// Length of the union of this record's intervals across channels.
    pub fn covered_length(&self) -> i64 {
        let mut intervals: Vec<Interval> = self.intervals().map(|(_, i)| *i).collect();
        union_length(&mut intervals)
    }
}

/// Everything the ledger stores for one flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightEntry {
    pub annotations: Vec<AnnotationRecord>,
    /// Absent on entries written before units were tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_units: Option<RangeUnits>,
}

impl FlightEntry {
    pub fn new_canonical() -> Self {
        Self {
            annotations: Vec::new(),
            range_units: Some(RangeUnits::Microseconds),
        }
    }

    /// Whether the ranges are microseconds on the flight's timeline.
    pub fn is_canonical(&self) -> bool {
        self.range_units == Some(RangeUnits::Microseconds)
    }
}

/// Total length covered by a set of intervals, counting overlaps once.
pub fn union_length(intervals: &mut [Interval]) -> i64 {
    intervals.sort_unstable();
    let mut total = 0i64;
    let mut current: Option<Interval> = None;
    for interval in intervals.iter() {
        current = match current {
            Some(open) if interval.start <= open.end => {
                Some(Interval::new(open.start, open.end.max(interval.end)))
            }
            Some(done) => {
                total = total.saturating_add(done.length());
                Some(*interval)
            }
            None => Some(*interval),
        };
    }
    if let Some(done) = current {
        total = total.saturating_add(done.length());
    }
    total
}

/// Record timestamps: written as RFC 3339 in UTC, read back from RFC 3339
/// or from offset-less ISO 8601 (taken as UTC).
mod iso_timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}
