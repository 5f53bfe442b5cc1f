//! Durable client-side key-value persistence.
//!
//! The cart survives restarts through a single durable slot. The storage
//! capability is injected so the production backend (a JSON file per key
//! under the state directory, standing in for browser local storage) can be
//! swapped for [`MemoryKeyValueStore`] in tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Errors from the persistence backend.
#[derive(Debug, Error)]
pub enum KvError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A durable string-to-string slot store.
///
/// `get` is infallible by contract: a slot that cannot be read is treated
/// as absent, mirroring how a missing local-storage key reads as `null`.
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `KvError` when the value cannot be made durable.
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Delete a slot. Deleting an absent slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `KvError` when an existing slot cannot be deleted.
    fn remove(&self, key: &str) -> Result<(), KvError>;
}

// =============================================================================
// FileKeyValueStore
// =============================================================================

/// File-backed [`KeyValueStore`]: one JSON file per key under a directory.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `KvError` when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, KvError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        // Keys are fixed internal names; keep them filesystem-safe anyway
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.slot_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        // Write-then-rename so a crash mid-write never leaves a torn slot
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MemoryKeyValueStore
// =============================================================================

/// In-memory [`KeyValueStore`] for tests.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with a pre-populated slot (test setup).
    #[must_use]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        #[allow(clippy::unwrap_used)]
        let mut slots = store.slots.lock().unwrap();
        slots.insert(key.to_string(), value.to_string());
        drop(slots);
        store
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        #[allow(clippy::unwrap_used)]
        let slots = self.slots.lock().unwrap();
        slots.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        #[allow(clippy::unwrap_used)]
        let mut slots = self.slots.lock().unwrap();
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), KvError> {
        #[allow(clippy::unwrap_used)]
        let mut slots = self.slots.lock().unwrap();
        slots.remove(key);
        Ok(())
    }
}
