//! Position memory
//!
//! Snapshots the playback offset into session-scoped storage on every timed
//! update and hands it back when a track is loaded.
//!
//! Two scopes are supported:
//! - `PerTrack`: one key per track id (`currentTime.<id>`)
//! - `Global`: a single key (`currentTime`) shared by every track, so
//!   switching tracks seeks the new track to the previous track's offset

use cassette_core::{KeyValueStore, PositionScope, TrackId};
use std::rc::Rc;

/// Session-scoped playback offset storage
pub struct PositionMemory {
    store: Rc<dyn KeyValueStore>,
    scope: PositionScope,
    key: String,
}

impl PositionMemory {
    pub fn new(store: Rc<dyn KeyValueStore>, scope: PositionScope, key: impl Into<String>) -> Self {
        Self {
            store,
            scope,
            key: key.into(),
        }
    }

    pub fn scope(&self) -> PositionScope {
        self.scope
    }

    /// Storage key holding the offset for `track_id`
    pub fn key_for(&self, track_id: TrackId) -> String {
        match self.scope {
            PositionScope::PerTrack => format!("{}.{}", self.key, track_id),
            PositionScope::Global => self.key.clone(),
        }
    }

    /// Overwrite the remembered offset
    ///
    /// Non-finite or negative offsets are ignored. Storage failures are
    /// logged and swallowed; losing a snapshot never interrupts playback.
    pub fn save(&self, track_id: TrackId, seconds: f64) {
        if !seconds.is_finite() || seconds < 0.0 {
            return;
        }
        let key = self.key_for(track_id);
        if let Err(e) = self.store.set(&key, &seconds.to_string()) {
            tracing::warn!(key, error = %e, "failed to save playback position");
        }
    }

    /// Offset to seek to when `track_id` is loaded
    pub fn restore(&self, track_id: TrackId) -> Option<f64> {
        let key = self.key_for(track_id);
        let raw = self.store.get(&key)?;
        match raw.trim().parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Some(seconds),
            _ => {
                tracing::debug!(key, raw, "ignoring unparsable playback position");
                None
            }
        }
    }

    /// Forget the offset for `track_id`
    pub fn forget(&self, track_id: TrackId) {
        self.store.remove(&self.key_for(track_id));
    }

    /// Forget every remembered offset, whatever the scope
    pub fn clear_all(&self) {
        self.store.remove(&self.key);
        self.store.remove_prefixed(&format!("{}.", self.key));
    }
}
