use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::CoreError;

/// Opaque key-value persistence capability.
///
/// The core never assumes a storage medium — a browser-local store, a file
/// tree, or an in-process map all satisfy this. Values are opaque strings
/// (the session layer serializes JSON into them).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Write `value` under `key`, replacing any previous value in full.
    fn save(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// In-process store backed by a plain map. Used in tests and anywhere the
/// session does not need to outlive the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
