//! Cassette Player Core
//!
//! Platform-agnostic core types, host-service traits, and error handling for
//! Cassette Player.
//!
//! This crate provides the building blocks shared by every host (browser,
//! native test harnesses).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `NewTrack`, `EncodedAudio`
//! - **Host Traits**: `TrackStore`, `KeyValueStore`, `MediaElement`, `FileSource`
//! - **Error Handling**: Unified `CassetteError` and `Result` types
//! - **Configuration**: `PlayerConfig`
//!
//! # Example
//!
//! ```rust
//! use cassette_core::{EncodedAudio, NewTrack};
//!
//! let audio = EncodedAudio::encode("audio/mpeg", b"ID3");
//! let track = NewTrack::new("song1.mp3", audio);
//!
//! assert!(track.encoded_audio.as_str().starts_with("data:audio/mpeg;base64,"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{PlayerConfig, PositionScope};
pub use error::{CassetteError, Result};
pub use traits::{FileSource, KeyValueStore, MediaElement, PlayFuture, ReadyState, TrackStore};
pub use types::{EncodedAudio, NewTrack, Track, TrackId};
