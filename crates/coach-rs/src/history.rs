//! Plan/feedback history.
//!
//! The history is an append-only sequence of [`HistoryEntry`] values. Only
//! its tail is ever read back: the last [`RECENT_HISTORY_LEN`] entries are
//! folded into the next prompt.
//!
//! [`JsonFileHistory`] stores the whole sequence as one JSON array and
//! rewrites it on every append (a fresh temp file renamed into place, so a
//! crash never leaves a torn file). Appends through one instance are
//! serialized; two processes appending at once can still lose one update.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::HistoryError;

/// How many entries are fed back into the next prompt.
pub const RECENT_HISTORY_LEN: usize = 2;

/// One generated plan and the athlete's feedback on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub plan: String,
    pub feedback: String,
}

impl HistoryEntry {
    pub fn new(plan: impl Into<String>, feedback: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            feedback: feedback.into(),
        }
    }
}

/// An ordered, append-only plan/feedback log.
pub trait HistoryLog: Send + Sync {
    /// The full sequence, oldest first. Empty when nothing was stored yet.
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// Append one entry after everything already stored.
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// The last `n` entries, oldest first (fewer if the log is shorter).
    fn recent(&self, n: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.load()?;
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
        Ok(entries)
    }
}

// ── JsonFileHistory ───────────────────────────────────────────────

/// History persisted as a JSON array of `{"plan", "feedback"}` objects.
///
/// Appends through one instance are serialized; share it (e.g. behind an
/// `Arc`) rather than opening the same path twice in one process.
#[derive(Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic write: serialize into a fresh temp file next to the target,
    /// then rename it into place.
    fn write_all(&self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|source| HistoryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;

        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(|source| HistoryError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|source| HistoryError::Write {
                path: tmp.path().to_path_buf(),
                source,
            })?;
        tmp.persist(&self.path).map_err(|e| HistoryError::Write {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl HistoryLog for JsonFileHistory {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&json).map_err(|source| HistoryError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        entries.push(entry);
        self.write_all(&entries)?;
        debug!(
            "History: {} entries written to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ── InMemoryHistory ───────────────────────────────────────────────

/// Process-local history that disappears on exit.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryLog for InMemoryHistory {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.clone())
    }

    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
        Ok(())
    }
}
