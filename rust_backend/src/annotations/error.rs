//! Error types for ledger operations.

use std::path::PathBuf;

use super::units::UnitsError;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed ledger at '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(
        "Reversed interval [{start}, {end}] in flight '{flight_id}', record {record}, channel '{channel}'"
    )]
    InvalidRange {
        flight_id: String,
        record: usize,
        channel: String,
        start: i64,
        end: i64,
    },

    #[error("Flight '{0}' holds ranges in unknown units; migrate it before appending")]
    UntaggedEntry(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unit migration failed: {0}")]
    Units(#[from] UnitsError),
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LedgerError::Io {
            path: path.into(),
            source,
        }
    }
}
