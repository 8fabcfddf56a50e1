//! Ledger JSON parsing and rendering.
//!
//! Parse failures carry the JSON path of the offending value, e.g.
//! `flight_07.annotations[2].ranges[0][1][3]`.

use std::collections::BTreeMap;

use crate::annotations::error::{LedgerError, LedgerResult};
use crate::annotations::model::FlightEntry;

/// Flight id → stored entry.
pub type LedgerData = BTreeMap<String, FlightEntry>;

/// Parse a ledger document. Whitespace-only input is an empty ledger.
pub fn parse_ledger_str(json: &str) -> LedgerResult<LedgerData> {
    if json.trim().is_empty() {
        return Ok(LedgerData::new());
    }

    let deserializer = &mut serde_json::Deserializer::from_str(json);
    let data: LedgerData =
        serde_path_to_error::deserialize(deserializer).map_err(|err| LedgerError::Parse {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        })?;

    validate_ledger(&data)?;
    Ok(data)
}

/// Render a ledger as indented JSON.
pub fn render_ledger(data: &LedgerData) -> LedgerResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Reject any reversed interval.
pub fn validate_ledger(data: &LedgerData) -> LedgerResult<()> {
    for (flight_id, entry) in data {
        for (idx, record) in entry.annotations.iter().enumerate() {
            if let Some((channel, interval)) = record.first_reversed() {
                return Err(LedgerError::InvalidRange {
                    flight_id: flight_id.clone(),
                    record: idx,
                    channel: channel.to_string(),
                    start: interval.start,
                    end: interval.end,
                });
            }
        }
    }
    Ok(())
}
