//! Volatile track store
//!
//! Behaves like the persistent stores (ids start at 1, insertion order,
//! reset restarts ids) and can be told to fail reads or writes.

use crate::error::StorageError;
use async_trait::async_trait;
use cassette_core::{NewTrack, Track, TrackId, TrackStore};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Inner {
    tracks: Vec<Track>,
    next_id: TrackId,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-memory track store
#[derive(Debug)]
pub struct MemoryTrackStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryTrackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTrackStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tracks: Vec::new(),
                next_id: 1,
                fail_writes: false,
                fail_reads: false,
            }),
        }
    }

    /// Make subsequent inserts fail as if the medium were full
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make subsequent reads fail as if the medium were corrupt
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.lock().tracks.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.lock().tracks.is_empty()
    }

    /// Look up a record by id
    pub fn get(&self, id: TrackId) -> Option<Track> {
        self.lock().tracks.iter().find(|t| t.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait(?Send)]
impl TrackStore for MemoryTrackStore {
    async fn insert(&self, track: &NewTrack) -> cassette_core::Result<TrackId> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".into()).into_write_error());
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.tracks.push(Track::from_new(id, track.clone()));
        Ok(id)
    }

    async fn list_all(&self) -> cassette_core::Result<Vec<Track>> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(StorageError::Unavailable("database corrupted".into()).into_read_error());
        }
        Ok(inner.tracks.clone())
    }

    async fn reset(&self) -> cassette_core::Result<()> {
        let mut inner = self.lock();
        inner.tracks.clear();
        inner.next_id = 1;
        Ok(())
    }
}
