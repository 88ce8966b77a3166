//! Player session - one per page load
//!
//! Wires the upload pipeline to the playback controller and exposes one
//! method per UI control and per media event.
//!
//! Methods that need audio return an optional [`PlayTicket`]. Native hosts
//! and tests can hand it to [`Player::drive`]; a browser host calls
//! [`Player::start_play`], awaits the future without borrowing the player,
//! then reports back through [`Player::complete_play`].

use crate::{
    context::PlayerContext,
    controller::{PlayTicket, PlaybackController},
    events::PlaybackEvent,
    playlist::Playlist,
    upload::{UploadJob, UploadPipeline, UploadState},
};
use cassette_core::{FileSource, PlayFuture, PlayerConfig, Result, Track, TrackStore};
use std::rc::Rc;

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct Uploaded {
    /// The stored record, with its store-assigned id
    pub track: Track,
    /// Playlist index the track was appended at
    pub index: usize,
    /// Play request raised by the post-upload advance
    pub ticket: Option<PlayTicket>,
}

/// Audio player session
pub struct Player {
    store: Rc<dyn TrackStore>,
    config: PlayerConfig,
    controller: PlaybackController,
    upload: UploadPipeline,
}

impl Player {
    /// Create a player with an empty playlist
    pub fn new(context: PlayerContext) -> Result<Self> {
        context.config.validate()?;

        let controller = PlaybackController::new(
            context.media,
            context.session,
            context.process,
            &context.config,
        );

        Ok(Self {
            store: context.store,
            config: context.config,
            controller,
            upload: UploadPipeline::new(),
        })
    }

    /// Create a player and load the playlist from the store
    ///
    /// A failed read degrades to an empty playlist.
    pub async fn start(context: PlayerContext) -> Result<Self> {
        let mut player = Self::new(context)?;
        let loaded = player.store.list_all().await;
        player.restore_playlist(loaded);
        Ok(player)
    }

    /// Install tracks read from the store
    pub fn restore_playlist(&mut self, loaded: Result<Vec<Track>>) {
        match loaded {
            Ok(tracks) => {
                tracing::info!(count = tracks.len(), "playlist loaded");
                self.controller.load_playlist(tracks);
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read track store, starting empty");
                self.controller.load_playlist(Vec::new());
                self.controller.emit(PlaybackEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    // ===== Upload =====

    /// File picker changed
    pub fn choose_file(&mut self, file: Rc<dyn FileSource>) -> Result<()> {
        self.upload.select_file(file)
    }

    /// Upload button: start a job for the staged file
    pub fn begin_upload(&mut self) -> Result<UploadJob> {
        self.upload.begin(Rc::clone(&self.store)).map_err(|e| {
            self.controller.emit(PlaybackEvent::UploadFailed {
                message: e.to_string(),
            });
            e
        })
    }

    /// Apply a job's outcome
    ///
    /// On success the track is appended and playback advances one slot. On
    /// failure the playlist is untouched and the error is returned for the
    /// host to show.
    pub fn finish_upload(&mut self, outcome: Result<Track>) -> Result<Uploaded> {
        match self.upload.finish(outcome) {
            Ok(track) => {
                let index = self.controller.append(track.clone());
                self.controller.emit(PlaybackEvent::UploadFinished {
                    track_id: track.id,
                    name: track.name.clone(),
                });
                let ticket = self.controller.advance_to_next();
                Ok(Uploaded {
                    track,
                    index,
                    ticket,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "upload failed");
                self.controller.emit(PlaybackEvent::UploadFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Run the whole upload flow and drive any resulting play request
    pub async fn upload(&mut self) -> Result<Uploaded> {
        let job = self.begin_upload()?;
        let outcome = job.run().await;
        let uploaded = self.finish_upload(outcome)?;
        self.drive(uploaded.ticket).await;
        Ok(uploaded)
    }

    // ===== Playback controls =====

    /// Playlist item clicked: load it and play
    pub fn play_track(&mut self, index: usize) -> Result<Option<PlayTicket>> {
        self.controller.play_track(index)
    }

    /// Load a track, resuming only if audio was already wanted
    pub fn select_track(&mut self, index: usize) -> Result<Option<PlayTicket>> {
        self.controller.select_track(index)
    }

    /// Next button
    pub fn next_track(&mut self) -> Option<PlayTicket> {
        self.controller.advance_to_next()
    }

    /// "Change source" demo button
    pub fn change_source(&mut self) -> Option<PlayTicket> {
        let source = self.config.change_source_placeholder.clone();
        self.controller.change_source(&source)
    }

    pub fn play(&mut self) -> Option<PlayTicket> {
        self.controller.play()
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    /// Reset button: wipe the store, then reinitialize as after a reload
    ///
    /// If the store cannot be wiped nothing else changes.
    pub async fn reset(&mut self) -> Result<()> {
        let store = self.store();
        let outcome = store.reset().await;
        self.finish_reset(outcome)?;
        let loaded = store.list_all().await;
        self.restore_playlist(loaded);
        Ok(())
    }

    /// Apply the outcome of wiping the store
    ///
    /// On success the playlist, selection, remembered offsets and staged file
    /// are dropped; the caller then reloads the (empty) playlist through
    /// [`restore_playlist`](Self::restore_playlist).
    pub fn finish_reset(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                tracing::info!("track store wiped");
                self.controller.reset();
                self.upload.reset();
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "reset failed");
                self.controller.emit(PlaybackEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // ===== Media events =====

    /// `canplay`
    pub fn on_ready(&mut self) -> Option<PlayTicket> {
        self.controller.on_ready()
    }

    /// `timeupdate`
    pub fn on_time_update(&mut self) {
        self.controller.on_time_update();
    }

    /// `ended`
    pub fn on_ended(&mut self) -> Option<PlayTicket> {
        self.controller.on_ended()
    }

    /// `pause`
    pub fn on_host_paused(&mut self) {
        self.controller.on_host_paused();
    }

    /// `playing`
    pub fn on_host_playing(&mut self) {
        self.controller.on_host_playing();
    }

    // ===== Play tickets =====

    /// Play future for a ticket, `None` when stale
    pub fn start_play(&self, ticket: PlayTicket) -> Option<PlayFuture> {
        self.controller.start(ticket)
    }

    /// Report a play outcome
    pub fn complete_play(&mut self, ticket: PlayTicket, outcome: std::result::Result<(), String>) {
        self.controller.complete_play(ticket, outcome);
    }

    /// Start, await and complete a ticket in one go
    ///
    /// Returns whether audio is playing afterwards.
    pub async fn drive(&mut self, ticket: Option<PlayTicket>) -> bool {
        if let Some(ticket) = ticket {
            if let Some(play) = self.start_play(ticket) {
                let outcome = play.await;
                self.complete_play(ticket, outcome);
            }
        }
        self.controller.is_playing()
    }

    // ===== State queries =====

    pub fn playlist(&self) -> &Playlist {
        self.controller.playlist()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.controller.current_index()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.controller.current_track()
    }

    /// Name shown under "Now Playing"
    pub fn now_playing(&self) -> Option<&str> {
        self.current_track().map(|track| track.name.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    pub fn upload_state(&self) -> UploadState {
        self.upload.state()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Shared handle to the track store
    pub fn store(&self) -> Rc<dyn TrackStore> {
        Rc::clone(&self.store)
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.controller.drain_events()
    }
}
