//! Cassette Player - Playback Management
//!
//! Platform-agnostic playlist, playback and upload state machine.
//!
//! This crate provides:
//! - Upload pipeline (stage a file, encode it as a data URL, persist it)
//! - Playlist in store load order, with wrap-around advance
//! - Track selection and play/pause over a single media element
//! - Playback offset memory that survives reloads within a session
//! - Event queue for UI synchronization
//!
//! # Architecture
//!
//! `cassette-playback` never touches a browser API:
//! - No dependency on `web-sys` (the `<audio>` element, storage, files)
//! - No dependency on `cassette-storage` (database)
//! - Works in the browser and in native tests
//!
//! Host services are injected through a [`PlayerContext`]. The player never
//! awaits while holding its own state: operations that need audio return a
//! [`PlayTicket`], and the host awaits the play call separately.
//!
//! # Example
//!
//! ```rust,no_run
//! use cassette_playback::{Player, PlayerContext};
//!
//! async fn on_upload_clicked(player: &mut Player) {
//!     match player.upload().await {
//!         Ok(uploaded) => println!("added {}", uploaded.track.name),
//!         Err(e) => eprintln!("upload failed: {e}"),
//!     }
//!
//!     for event in player.drain_events() {
//!         println!("{event:?}");
//!     }
//! }
//! # let _ = on_upload_clicked;
//! # fn _ctx(_: PlayerContext) {}
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod controller;
pub mod events;
pub mod player;
pub mod playlist;
pub mod position;
pub mod upload;

pub use context::PlayerContext;
pub use controller::{PlayTicket, PlaybackController};
pub use events::PlaybackEvent;
pub use player::{Player, Uploaded};
pub use playlist::Playlist;
pub use position::PositionMemory;
pub use upload::{UploadJob, UploadPipeline, UploadState};

// Re-export core types for convenience
pub use cassette_core::{CassetteError, PlayerConfig, PositionScope, Result, Track, TrackId};
