//! Annotation records and the ledger that persists them.

pub mod error;
pub mod ledger;
pub mod model;
pub mod store;
pub mod units;

pub use error::{LedgerError, LedgerResult};
pub use ledger::AnnotationLedger;
pub use model::{AnnotationRange, AnnotationRecord, AnomalyClass, FlightEntry, Interval};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
pub use units::{detect, migrate, RangeUnits, UnitsError};
