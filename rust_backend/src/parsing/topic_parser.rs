use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::catalog::TopicCatalog;
use crate::core::domain::{Series, SeriesError, SourceId};

/// One decoded dataset: a timestamp column plus one column per attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicData {
    pub timestamps: Vec<i64>,
    pub fields: BTreeMap<String, Vec<f64>>,
}

/// Decoded contents of one flight log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicDump {
    pub datasets: BTreeMap<String, TopicData>,
}

/// Anything that can hand out decoded datasets by name.
pub trait TopicSource {
    fn dataset(&self, name: &str) -> Option<&TopicData>;
}

impl TopicSource for TopicDump {
    fn dataset(&self, name: &str) -> Option<&TopicData> {
        self.datasets.get(name)
    }
}

/// Raw JSON cell. Integers are kept apart from floats so large timestamps
/// survive exactly; booleans map to 0/1 and null to NaN.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Null(()),
}

impl Cell {
    fn as_f64(&self) -> f64 {
        match self {
            Cell::Int(i) => *i as f64,
            Cell::Float(f) => *f,
            Cell::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Cell::Null(()) => f64::NAN,
        }
    }

    fn as_timestamp(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Float(f) if f.is_finite() => Some(f.round() as i64),
            _ => None,
        }
    }
}

type RawDump = BTreeMap<String, BTreeMap<String, Vec<Cell>>>;

/// Parse a topic dump from a JSON string.
pub fn parse_topic_dump_str(json_str: &str) -> Result<TopicDump> {
    let deserializer = &mut serde_json::Deserializer::from_str(json_str);
    let raw: RawDump = serde_path_to_error::deserialize(deserializer)
        .map_err(|e| anyhow::anyhow!("{} at '{}'", e.inner(), e.path()))
        .context("Failed to parse topic dump JSON")?;

    let mut datasets = BTreeMap::new();
    for (name, mut columns) in raw {
        let timestamps = columns
            .remove("timestamp")
            .with_context(|| format!("Dataset '{}' has no timestamp column", name))?
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                cell.as_timestamp().with_context(|| {
                    format!("Dataset '{}' has an invalid timestamp at index {}", name, idx)
                })
            })
            .collect::<Result<Vec<i64>>>()?;

        let fields = columns
            .into_iter()
            .map(|(attribute, cells)| (attribute, cells.iter().map(Cell::as_f64).collect()))
            .collect();

        datasets.insert(name, TopicData { timestamps, fields });
    }

    Ok(TopicDump { datasets })
}

/// Parse a topic dump file.
pub fn parse_topic_dump(json_path: &Path) -> Result<TopicDump> {
    let content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read topic dump: {}", json_path.display()))?;
    parse_topic_dump_str(&content)
        .with_context(|| format!("Failed to parse topic dump: {}", json_path.display()))
}

/// Pull every catalog column out of `source`, in catalog order.
///
/// Datasets and attributes the source lacks are logged and skipped.
pub fn extract_series(
    source: &dyn TopicSource,
    catalog: &TopicCatalog,
) -> Result<Vec<Series>, SeriesError> {
    let mut series = Vec::with_capacity(catalog.column_count());
    for selection in catalog.topics() {
        let Some(data) = source.dataset(&selection.dataset) else {
            log::warn!("Dataset '{}' not found, skipping", selection.dataset);
            continue;
        };
        for attribute in &selection.attributes {
            let Some(values) = data.fields.get(attribute) else {
                log::warn!(
                    "Attribute '{}' not found in dataset '{}', skipping",
                    attribute,
                    selection.dataset
                );
                continue;
            };
            series.push(Series::new(
                SourceId::new(selection.dataset.as_str(), attribute.as_str()),
                data.timestamps.clone(),
                values.clone(),
            )?);
        }
    }
    Ok(series)
}
