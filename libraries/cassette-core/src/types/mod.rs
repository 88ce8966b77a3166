//! Domain types for Cassette Player

pub mod encoded;
pub mod track;

pub use encoded::EncodedAudio;
pub use track::{NewTrack, Track, TrackId};
