//! Playback Events
//!
//! Event-based communication for UI synchronization. The player queues an
//! event at every observable transition; the host drains the queue after
//! each call and re-renders.

use cassette_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlaybackEvent {
    /// A playlist entry was loaded into the media element
    TrackChanged {
        index: usize,
        track_id: TrackId,
        /// Offset the media was seeked to, if one was remembered
        restored_offset: Option<f64>,
    },

    /// A source outside the playlist was assigned (demo control)
    SourceOverridden { source: String },

    /// `is_playing` flipped
    StateChanged { is_playing: bool },

    /// Tracks were loaded, appended or wiped
    PlaylistChanged { length: usize },

    /// The host refused to start playback
    PlaybackRejected { reason: String },

    /// An upload was stored and appended
    UploadFinished { track_id: TrackId, name: String },

    /// An upload failed; the message is shown to the user
    UploadFailed { message: String },

    /// Non-fatal failure outside the upload flow (e.g. degraded startup)
    Error { message: String },
}
