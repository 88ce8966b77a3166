/// Track domain type
use crate::types::EncodedAudio;
use serde::{Deserialize, Serialize};

/// Track identifier, assigned by the track store on insert
pub type TrackId = i64;

/// Uploaded audio track
///
/// Immutable once created; the only way to remove one is a full store reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Store-assigned identifier
    pub id: TrackId,

    /// Original file name
    pub name: String,

    /// Self-contained encoding of the file bytes, usable as a media source
    #[serde(rename = "song")]
    pub encoded_audio: EncodedAudio,
}

impl Track {
    /// Attach a store-assigned id to a pending record
    pub fn from_new(id: TrackId, track: NewTrack) -> Self {
        Self {
            id,
            name: track.name,
            encoded_audio: track.encoded_audio,
        }
    }
}

/// Track record before the store has assigned an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrack {
    /// Original file name
    pub name: String,

    /// Encoded audio payload
    #[serde(rename = "song")]
    pub encoded_audio: EncodedAudio,
}

impl NewTrack {
    /// Create a new pending track record
    pub fn new(name: impl Into<String>, encoded_audio: EncodedAudio) -> Self {
        Self {
            name: name.into(),
            encoded_audio,
        }
    }
}
