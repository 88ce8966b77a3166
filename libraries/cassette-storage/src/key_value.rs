//! In-process key-value storage
//!
//! Stands in for the browser's `sessionStorage`/`localStorage` on native
//! hosts and in tests.

use cassette_core::{CassetteError, KeyValueStore};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    inner: Mutex<Inner>,
}

impl MemoryKeyValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail as if the quota were exhausted
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Snapshot of all keys
    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> cassette_core::Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(CassetteError::storage_write(format!(
                "quota exceeded writing {key}"
            )));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.lock().entries.remove(key);
    }

    fn remove_prefixed(&self, prefix: &str) {
        self.lock().entries.retain(|k, _| !k.starts_with(prefix));
    }
}
