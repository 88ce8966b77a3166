//! Track table inside a key-value store
//!
//! Records are kept as one JSON array of `{id, name, song}` objects, with the
//! id counter stored next to it so ids are never reused until a reset.

use crate::error::StorageError;
use async_trait::async_trait;
use cassette_core::{KeyValueStore, NewTrack, Track, TrackId, TrackStore};

/// Key holding the JSON array of records
pub const SONGS_KEY: &str = "cassette.songs";

/// Key holding the next id to assign
pub const NEXT_ID_KEY: &str = "cassette.songs.next_id";

/// Track store backed by a [`KeyValueStore`]
#[derive(Debug)]
pub struct KeyValueTrackStore<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValueTrackStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying key-value store
    pub fn inner(&self) -> &S {
        &self.store
    }

    fn read_tracks(&self) -> Result<Vec<Track>, StorageError> {
        match self.store.get(SONGS_KEY) {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError::Unavailable(format!("corrupt track table: {e}"))),
        }
    }

    /// Next id, never below one past the highest stored id
    fn next_id(&self, tracks: &[Track]) -> TrackId {
        let counter = self
            .store
            .get(NEXT_ID_KEY)
            .and_then(|raw| raw.trim().parse::<TrackId>().ok())
            .unwrap_or(1);
        let after_max = tracks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        counter.max(after_max)
    }
}

#[async_trait(?Send)]
impl<S: KeyValueStore> TrackStore for KeyValueTrackStore<S> {
    async fn insert(&self, track: &NewTrack) -> cassette_core::Result<TrackId> {
        let mut tracks = self.read_tracks().map_err(StorageError::into_write_error)?;
        let id = self.next_id(&tracks);
        tracks.push(Track::from_new(id, track.clone()));

        let encoded = serde_json::to_string(&tracks)?;
        self.store.set(SONGS_KEY, &encoded)?;

        if let Err(e) = self.store.set(NEXT_ID_KEY, &(id + 1).to_string()) {
            // Recomputed from the table on the next insert
            tracing::warn!(error = %e, "failed to persist track id counter");
        }

        tracing::debug!(id, bytes = encoded.len(), "track table written");
        Ok(id)
    }

    async fn list_all(&self) -> cassette_core::Result<Vec<Track>> {
        self.read_tracks().map_err(StorageError::into_read_error)
    }

    async fn reset(&self) -> cassette_core::Result<()> {
        self.store.remove(SONGS_KEY);
        self.store.remove(NEXT_ID_KEY);
        Ok(())
    }
}
