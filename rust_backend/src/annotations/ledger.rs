//! The annotation ledger: flight id → list of annotation records.
//!
//! The ledger is loaded once when opened and flushed to its store after
//! every mutation. State sits behind a `parking_lot::RwLock`, so a ledger
//! can be shared by reference between threads of one process. A mutation is
//! applied to a copy, saved, and only then made visible, so the in-memory
//! view never runs ahead of what was persisted.
//!
//! Two processes writing the same ledger file will not tear it (the file
//! store replaces it atomically) but the later flush wins.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use parking_lot::RwLock;

use super::error::{LedgerError, LedgerResult};
use super::model::{AnnotationRecord, AnomalyClass, FlightEntry};
use super::store::{JsonFileStore, LedgerStore, MemoryStore};
use super::units::{self, RangeUnits};
use crate::parsing::ledger_parser::{validate_ledger, LedgerData};

pub struct AnnotationLedger<S: LedgerStore = JsonFileStore> {
    store: S,
    data: RwLock<LedgerData>,
}

impl AnnotationLedger<JsonFileStore> {
    /// Open the ledger file at `path`; a missing file is an empty ledger.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        Self::with_store(JsonFileStore::new(path.as_ref()))
    }
}

impl AnnotationLedger<MemoryStore> {
    pub fn in_memory() -> Self {
        Self {
            store: MemoryStore::new(),
            data: RwLock::new(LedgerData::new()),
        }
    }
}

impl<S: LedgerStore> AnnotationLedger<S> {
    pub fn with_store(store: S) -> LedgerResult<Self> {
        let data = store.load()?;
        validate_ledger(&data)?;
        log::info!("Loaded {} annotated flights from {}", data.len(), store.describe());
        Ok(Self {
            store,
            data: RwLock::new(data),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records of a flight in insertion order; empty when the flight has
    /// none.
    pub fn get(&self, flight_id: &str) -> Vec<AnnotationRecord> {
        self.data
            .read()
            .get(flight_id)
            .map(|entry| entry.annotations.clone())
            .unwrap_or_default()
    }

    pub fn entry(&self, flight_id: &str) -> Option<FlightEntry> {
        self.data.read().get(flight_id).cloned()
    }

    /// Append a record and flush. Appending the same record twice stores it
    /// twice.
    pub fn append(&self, flight_id: &str, record: AnnotationRecord) -> LedgerResult<()> {
        if let Some((channel, interval)) = record.first_reversed() {
            let existing = self
                .data
                .read()
                .get(flight_id)
                .map_or(0, |e| e.annotations.len());
            return Err(LedgerError::InvalidRange {
                flight_id: flight_id.to_string(),
                record: existing,
                channel: channel.to_string(),
                start: interval.start,
                end: interval.end,
            });
        }

        let class_label = record.class_label;
        self.mutate(|data| {
            let entry = data
                .entry(flight_id.to_string())
                .or_insert_with(FlightEntry::new_canonical);
            if !entry.is_canonical() {
                return Err(LedgerError::UntaggedEntry(flight_id.to_string()));
            }
            entry.annotations.push(record);
            Ok(())
        })?;
        log::info!("Appended {} annotation to {}", class_label, flight_id);
        Ok(())
    }

    /// Drop every record of a flight. Returns whether anything was removed;
    /// nothing is flushed when the flight was absent.
    pub fn clear(&self, flight_id: &str) -> LedgerResult<bool> {
        if !self.data.read().contains_key(flight_id) {
            return Ok(false);
        }
        self.mutate(|data| {
            data.remove(flight_id);
            Ok(())
        })?;
        log::info!("Cleared annotations of {}", flight_id);
        Ok(true)
    }

    pub fn all_flight_ids(&self) -> HashSet<String> {
        self.data.read().keys().cloned().collect()
    }

    pub fn flight_count(&self) -> usize {
        self.data.read().len()
    }

    /// Distinct classes recorded for a flight.
    pub fn classes_for(&self, flight_id: &str) -> BTreeSet<AnomalyClass> {
        self.data
            .read()
            .get(flight_id)
            .map(|entry| entry.annotations.iter().map(|r| r.class_label).collect())
            .unwrap_or_default()
    }

    /// Consistent copy of the whole ledger.
    pub fn snapshot(&self) -> LedgerData {
        self.data.read().clone()
    }

    /// Flights whose ranges are not yet in microseconds, in id order.
    pub fn untagged_flights(&self) -> Vec<String> {
        self.data
            .read()
            .iter()
            .filter(|(_, entry)| !entry.is_canonical())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Convert a legacy entry to microseconds using the flight's table
    /// timestamps, then flush.
    pub fn migrate_flight(
        &self,
        flight_id: &str,
        from: RangeUnits,
        timestamps: &[i64],
    ) -> LedgerResult<()> {
        self.mutate(|data| {
            let entry = data
                .get_mut(flight_id)
                .ok_or_else(|| LedgerError::NotFound(flight_id.to_string()))?;
            units::migrate(entry, from, timestamps)?;
            Ok(())
        })?;
        log::info!("Migrated {} from {:?} to microseconds", flight_id, from);
        Ok(())
    }

    fn mutate<F>(&self, change: F) -> LedgerResult<()>
    where
        F: FnOnce(&mut LedgerData) -> LedgerResult<()>,
    {
        let mut guard = self.data.write();
        let mut next = guard.clone();
        change(&mut next)?;
        self.store.save(&next)?;
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::model::{AnnotationRange, Interval};

    fn record(class_label: AnomalyClass, start: i64, end: i64) -> AnnotationRecord {
        AnnotationRecord::new(
            class_label,
            "",
            vec![AnnotationRange::new("Attitude.Roll", vec![Interval::new(start, end)])],
        )
    }

    #[test]
    fn test_get_of_unknown_flight_is_empty() {
        let ledger = AnnotationLedger::in_memory();
        assert!(ledger.get("nope").is_empty());
        assert_eq!(ledger.flight_count(), 0);
    }

    #[test]
    fn test_append_is_not_idempotent_and_flushes_each_time() {
        let ledger = AnnotationLedger::in_memory();
        let rec = record(AnomalyClass::Mechanical, 0, 10);
        ledger.append("f1", rec.clone()).unwrap();
        ledger.append("f1", rec.clone()).unwrap();

        assert_eq!(ledger.get("f1"), vec![rec.clone(), rec]);
        assert_eq!(ledger.store().save_count(), 2);
        assert_eq!(ledger.store().persisted(), ledger.snapshot());
        assert_eq!(
            ledger.entry("f1").unwrap().range_units,
            Some(RangeUnits::Microseconds)
        );
    }

    #[test]
    fn test_clear_of_absent_flight_does_not_flush() {
        let ledger = AnnotationLedger::in_memory();
        assert!(!ledger.clear("ghost").unwrap());
        assert_eq!(ledger.store().save_count(), 0);

        ledger.append("f1", record(AnomalyClass::Heading, 1, 2)).unwrap();
        assert!(ledger.clear("f1").unwrap());
        assert!(ledger.get("f1").is_empty());
        assert!(ledger.all_flight_ids().is_empty());
        assert_eq!(ledger.store().save_count(), 2);
    }

    #[test]
    fn test_reversed_interval_rejected_on_append() {
        let ledger = AnnotationLedger::in_memory();
        let err = ledger
            .append("f1", record(AnomalyClass::Altitude, 30, 20))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidRange { record: 0, .. }));
        assert_eq!(ledger.flight_count(), 0);
        assert_eq!(ledger.store().save_count(), 0);
    }

    #[test]
    fn test_classes_for_is_distinct() {
        let ledger = AnnotationLedger::in_memory();
        ledger.append("f1", record(AnomalyClass::Mechanical, 0, 1)).unwrap();
        ledger.append("f1", record(AnomalyClass::Electrical, 0, 1)).unwrap();
        ledger.append("f1", record(AnomalyClass::Mechanical, 2, 3)).unwrap();

        let classes: Vec<AnomalyClass> = ledger.classes_for("f1").into_iter().collect();
        assert_eq!(classes, vec![AnomalyClass::Mechanical, AnomalyClass::Electrical]);
    }

    #[test]
    fn test_untagged_entry_blocks_append_until_migrated() {
        let mut legacy = LedgerData::new();
        legacy.insert(
            "old".to_string(),
            FlightEntry {
                annotations: vec![record(AnomalyClass::Altitude, 2, 4)],
                range_units: None,
            },
        );
        let ledger = AnnotationLedger::with_store(MemoryStore::with_data(legacy)).unwrap();
        assert_eq!(ledger.untagged_flights(), vec!["old".to_string()]);

        let err = ledger
            .append("old", record(AnomalyClass::Altitude, 0, 1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::UntaggedEntry(_)));
        assert_eq!(ledger.get("old").len(), 1);

        let timestamps: Vec<i64> = (0..10).map(|i| 1_000 + i * 100).collect();
        ledger
            .migrate_flight("old", RangeUnits::RowIndex, &timestamps)
            .unwrap();
        assert_eq!(
            ledger.get("old")[0].ranges[0].intervals[0],
            Interval::new(1_200, 1_400)
        );

        ledger
            .append("old", record(AnomalyClass::Altitude, 1_000, 1_100))
            .unwrap();
        assert_eq!(ledger.get("old").len(), 2);
    }

    #[test]
    fn test_migrate_unknown_flight() {
        let ledger = AnnotationLedger::in_memory();
        assert!(matches!(
            ledger.migrate_flight("none", RangeUnits::Milliseconds, &[]),
            Err(LedgerError::NotFound(_))
        ));
    }
}
