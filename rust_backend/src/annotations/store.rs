//! Persistence backends for the annotation ledger.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::error::{LedgerError, LedgerResult};
use crate::parsing::ledger_parser::{parse_ledger_str, render_ledger, LedgerData};

/// Where a ledger is loaded from and flushed to.
pub trait LedgerStore: Send + Sync {
    /// Load the full ledger. A store that holds nothing yet yields an empty
    /// ledger.
    fn load(&self) -> LedgerResult<LedgerData>;

    /// Replace the persisted ledger with `data`.
    fn save(&self, data: &LedgerData) -> LedgerResult<()>;

    /// Human-readable location for log lines.
    fn describe(&self) -> String;
}

/// JSON document on disk.
///
/// Saves go to a sibling `*.tmp` file which is then renamed over the ledger,
/// so a reader sees either the previous or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ledger.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> LedgerResult<LedgerData> {
        if !self.path.exists() {
            log::info!("No ledger at {}, starting empty", self.path.display());
            return Ok(LedgerData::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| LedgerError::io(&self.path, e))?;
        parse_ledger_str(&content)
    }

    fn save(&self, data: &LedgerData) -> LedgerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LedgerError::io(parent, e))?;
            }
        }

        let rendered = render_ledger(data)?;
        let temp = self.temp_path();
        fs::write(&temp, rendered).map_err(|e| LedgerError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| LedgerError::io(&self.path, e))?;
        log::debug!("Flushed {} flights to {}", data.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<LedgerData>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `data`.
    pub fn with_data(data: LedgerData) -> Self {
        Self {
            data: Mutex::new(data),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> LedgerData {
        self.data.lock().clone()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> LedgerResult<LedgerData> {
        Ok(self.data.lock().clone())
    }

    fn save(&self, data: &LedgerData) -> LedgerResult<()> {
        *self.data.lock() = data.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
