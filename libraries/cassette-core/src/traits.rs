//! Host-service traits
//!
//! The player never touches a browser API directly. Every host service is
//! reached through one of these traits and handed to the player inside an
//! explicitly constructed context, so the state machine runs the same way
//! against `web-sys` objects and against in-memory fakes.
//!
//! The event loop is single-threaded; implementors are not required to be
//! `Send`, and async methods use `async_trait(?Send)`.

use crate::error::Result;
use crate::types::{NewTrack, Track, TrackId};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;

/// Persistent table of uploaded tracks
#[async_trait(?Send)]
pub trait TrackStore {
    /// Durably insert a record and return the id the store assigned
    ///
    /// # Errors
    /// `CassetteError::StorageWrite` if the medium is unavailable or full
    async fn insert(&self, track: &NewTrack) -> Result<TrackId>;

    /// Read every record in load (insertion) order
    ///
    /// # Errors
    /// `CassetteError::StorageRead` on corruption or unavailability
    async fn list_all(&self) -> Result<Vec<Track>>;

    /// Destroy all records and schema metadata
    ///
    /// Idempotent. Ids restart from 1 afterwards.
    async fn reset(&self) -> Result<()>;
}

/// String key-value storage (`sessionStorage` / `localStorage` shaped)
pub trait KeyValueStore {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, overwriting any previous one
    ///
    /// # Errors
    /// `CassetteError::StorageWrite` if the host refuses the write
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value; missing keys are ignored
    fn remove(&self, key: &str);

    /// Remove every key starting with `prefix`
    fn remove_prefixed(&self, prefix: &str);
}

/// Media readiness, mirroring `HTMLMediaElement.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    /// No information about the source
    #[default]
    HaveNothing,
    /// Duration and dimensions known
    HaveMetadata,
    /// Data for the current position only
    HaveCurrentData,
    /// Enough data to advance playback
    HaveFutureData,
    /// Enough data to play through without stalling
    HaveEnoughData,
}

impl ReadyState {
    /// Convert the numeric `readyState` (0-4)
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::HaveNothing,
            1 => Self::HaveMetadata,
            2 => Self::HaveCurrentData,
            3 => Self::HaveFutureData,
            _ => Self::HaveEnoughData,
        }
    }

    /// Whether a play call can start without waiting for the ready signal
    pub fn can_play(self) -> bool {
        self >= Self::HaveFutureData
    }
}

/// Outcome of a host play request
///
/// `Err` carries the host's rejection reason (autoplay policy, unsupported
/// source, aborted load).
pub type PlayFuture = LocalBoxFuture<'static, std::result::Result<(), String>>;

/// The single active media element
///
/// Methods take `&self`: host elements are shared handles with their own
/// interior state.
pub trait MediaElement {
    /// Pause playback (no-op when already paused)
    fn pause(&self);

    /// Assign a new source URL; the host starts loading it
    fn set_source(&self, src: &str);

    /// Remove the current source
    fn clear_source(&self);

    /// Currently assigned source
    fn source(&self) -> Option<String>;

    /// Current readiness of the loaded source
    fn ready_state(&self) -> ReadyState;

    /// Whether the element is paused (`HTMLMediaElement.paused`)
    fn is_paused(&self) -> bool;

    /// Whether playback reached the end of the source
    fn has_ended(&self) -> bool;

    /// Playback offset in seconds
    fn current_time(&self) -> f64;

    /// Seek to an offset in seconds
    fn seek(&self, seconds: f64);

    /// Ask the host to start playback
    ///
    /// The returned future resolves once the host has accepted or rejected
    /// the request. It owns everything it needs, so the caller can drop its
    /// borrow of the player while awaiting.
    fn play(&self) -> PlayFuture;
}

/// A user-selected file
#[async_trait(?Send)]
pub trait FileSource {
    /// File name as shown to the user
    fn name(&self) -> String;

    /// MIME type reported by the host, if any
    fn mime_type(&self) -> Option<String>;

    /// Read the whole file into memory
    ///
    /// # Errors
    /// `CassetteError::Encoding` (or `Io`) if the file cannot be read
    async fn read_all(&self) -> Result<Vec<u8>>;
}
