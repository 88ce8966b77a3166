//! `sessionStorage` / `localStorage` adapters

use crate::media::describe_js_error;
use cassette_core::{CassetteError, KeyValueStore};
use cassette_storage::KeyValueTrackStore;
use gloo_storage::{LocalStorage, SessionStorage, Storage};

/// Track table persisted in `localStorage`
///
/// Web Storage holds a few megabytes per origin, so this only backs the
/// player where IndexedDB is unavailable.
pub type LocalStorageTrackStore = KeyValueTrackStore<BrowserStorage>;

/// One of the browser's Web Storage areas
///
/// Values are stored as plain strings, not JSON, so they stay readable from
/// the devtools storage panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserStorage {
    /// Cleared when the tab closes
    Session,
    /// Survives restarts
    Local,
}

impl BrowserStorage {
    fn raw(self) -> web_sys::Storage {
        match self {
            Self::Session => SessionStorage::raw(),
            Self::Local => LocalStorage::raw(),
        }
    }

    fn keys(self) -> Vec<String> {
        let storage = self.raw();
        let len = storage.length().unwrap_or(0);
        (0..len)
            .filter_map(|i| storage.key(i).ok().flatten())
            .collect()
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> cassette_core::Result<()> {
        self.raw().set_item(key, value).map_err(|e| {
            CassetteError::storage_write(format!("{key}: {}", describe_js_error(e)))
        })
    }

    fn remove(&self, key: &str) {
        let _ = self.raw().remove_item(key);
    }

    fn remove_prefixed(&self, prefix: &str) {
        let storage = self.raw();
        for key in self.keys().into_iter().filter(|k| k.starts_with(prefix)) {
            let _ = storage.remove_item(&key);
        }
    }
}

/// Fallback track store for browsers without IndexedDB
pub fn local_track_store() -> LocalStorageTrackStore {
    KeyValueTrackStore::new(BrowserStorage::Local)
}
