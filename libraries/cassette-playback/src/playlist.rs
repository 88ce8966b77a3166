//! Playlist model
//!
//! In-memory ordered sequence of uploaded tracks. Order is load/insertion
//! order; "next" is defined by position, not by any stored priority.

use cassette_core::{Track, TrackId};

/// Ordered tracks available for playback
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tracks read out of the store
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Append a freshly stored track, returning its index
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Drop every track
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Position of the track with the given id
    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Index that follows `current`, wrapping after the last track
    ///
    /// `None` for an empty playlist. With no current index the first track
    /// is next.
    pub fn next_index(&self, current: Option<usize>) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }
        Some(match current {
            Some(index) => (index + 1) % self.tracks.len(),
            None => 0,
        })
    }
}
