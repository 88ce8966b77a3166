//! Playback controller
//!
//! Owns the playlist, the single media element, the selected index and the
//! `is_playing` flag.
//!
//! # Deferred play
//!
//! Starting audio is split in two so the controller never awaits while
//! holding state:
//!
//! 1. An operation that wants audio (`play`, `select_track` while playing,
//!    `on_ready`, ...) returns a [`PlayTicket`] when the media can play now.
//!    If the media is not ready yet, the request is parked for the current
//!    selection and the ticket is handed out later by [`on_ready`].
//! 2. The host awaits [`start`] (the element's play promise) and reports the
//!    outcome through [`complete_play`].
//!
//! Every selection change bumps a generation counter, and every pause bumps
//! the attempt counter. A parked request or an outcome whose ticket no longer
//! matches both counters is discarded, so a slow ready signal or play promise
//! for a superseded track can never start or mark playback.
//!
//! [`on_ready`]: PlaybackController::on_ready
//! [`start`]: PlaybackController::start
//! [`complete_play`]: PlaybackController::complete_play

use crate::{events::PlaybackEvent, playlist::Playlist, position::PositionMemory};
use cassette_core::{
    CassetteError, KeyValueStore, MediaElement, PlayFuture, PlayerConfig, PositionScope, Result,
    Track,
};
use std::rc::Rc;

/// Permission to issue one play call for one selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayTicket {
    /// Selection generation the ticket was issued for
    pub generation: u64,
    /// Play attempt the ticket belongs to
    pub attempt: u64,
    /// Playlist index selected at issue time (`None` for an overridden source)
    pub index: Option<usize>,
}

/// Offset to re-apply once the media for a selection is ready
#[derive(Debug, Clone, Copy)]
struct PendingRestore {
    generation: u64,
    seconds: f64,
}

/// Track selection, media source and play state
pub struct PlaybackController {
    media: Rc<dyn MediaElement>,
    process_store: Rc<dyn KeyValueStore>,
    track_id_key: String,
    position: PositionMemory,

    playlist: Playlist,
    current: Option<usize>,
    is_playing: bool,
    source_overridden: bool,

    generation: u64,
    attempt: u64,
    pending_play: Option<u64>,
    in_flight: Option<u64>,
    pending_restore: Option<PendingRestore>,

    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller with an empty playlist
    pub fn new(
        media: Rc<dyn MediaElement>,
        session_store: Rc<dyn KeyValueStore>,
        process_store: Rc<dyn KeyValueStore>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            media,
            process_store,
            track_id_key: config.track_id_key.clone(),
            position: PositionMemory::new(
                session_store,
                config.position_scope,
                config.position_key.clone(),
            ),
            playlist: Playlist::new(),
            current: None,
            is_playing: false,
            source_overridden: false,
            generation: 0,
            attempt: 0,
            pending_play: None,
            in_flight: None,
            pending_restore: None,
            pending_events: Vec::new(),
        }
    }

    // ===== Playlist =====

    /// Replace the playlist with tracks read from the store
    ///
    /// A non-empty playlist gets its first track loaded (without playing) so
    /// the selected index always has a matching source.
    pub fn load_playlist(&mut self, tracks: Vec<Track>) {
        self.stop_and_unload();
        self.playlist = Playlist::from_tracks(tracks);
        self.emit(PlaybackEvent::PlaylistChanged {
            length: self.playlist.len(),
        });

        if !self.playlist.is_empty() {
            self.load_index(0);
        }
    }

    /// Append an uploaded track; the selection is left alone
    pub fn append(&mut self, track: Track) -> usize {
        let index = self.playlist.push(track);
        self.emit(PlaybackEvent::PlaylistChanged {
            length: self.playlist.len(),
        });
        index
    }

    /// Wipe playlist, selection, remembered offsets and the media source
    pub fn reset(&mut self) {
        self.stop_and_unload();
        self.playlist.clear();
        self.position.clear_all();
        self.process_store.remove(&self.track_id_key);
        self.emit(PlaybackEvent::PlaylistChanged { length: 0 });
    }

    // ===== Track selection =====

    /// Load the track at `index`, resuming playback if audio was wanted
    ///
    /// Audio is "wanted" when playing, when a play is parked waiting for the
    /// ready signal, or when a play call is in flight. The returned ticket
    /// must be passed to [`start`](Self::start).
    pub fn select_track(&mut self, index: usize) -> Result<Option<PlayTicket>> {
        let len = self.playlist.len();
        if index >= len {
            return Err(CassetteError::IndexOutOfBounds { index, len });
        }

        let resume = self.wants_audio();
        self.load_index(index);

        Ok(if resume { self.request_play() } else { None })
    }

    /// Load the track at `index` and play it regardless of prior state
    ///
    /// This is the playlist-click action.
    pub fn play_track(&mut self, index: usize) -> Result<Option<PlayTicket>> {
        let ticket = self.select_track(index)?;
        Ok(ticket.or_else(|| self.request_play()))
    }

    /// Move to the following track, wrapping to the first after the last
    ///
    /// No-op on an empty playlist.
    pub fn advance_to_next(&mut self) -> Option<PlayTicket> {
        let next = self.playlist.next_index(self.current)?;
        tracing::debug!(from = ?self.current, to = next, "advancing to next track");
        self.select_track(next).ok().flatten()
    }

    /// Assign a source that is not part of the playlist
    ///
    /// Demo hook behind the "change source" control. The selected index is
    /// kept; position snapshots are suspended until a playlist track is
    /// loaded again.
    pub fn change_source(&mut self, source: &str) -> Option<PlayTicket> {
        let resume = self.wants_audio();

        self.media.pause();
        self.set_playing(false);
        self.begin_selection();
        self.pending_restore = None;
        self.media.set_source(source);
        self.source_overridden = true;

        self.emit(PlaybackEvent::SourceOverridden {
            source: source.to_string(),
        });

        if resume {
            self.request_play()
        } else {
            None
        }
    }

    // ===== Play / pause =====

    /// Request playback of the loaded source
    ///
    /// Returns a ticket right away when the media can play; otherwise the
    /// request waits for [`on_ready`](Self::on_ready). Nothing happens when
    /// already playing or when nothing is loaded.
    pub fn play(&mut self) -> Option<PlayTicket> {
        if self.is_playing {
            return None;
        }
        self.request_play()
    }

    /// Pause playback and drop any parked or in-flight play request
    pub fn pause(&mut self) {
        self.media.pause();
        self.attempt += 1;
        self.pending_play = None;
        self.in_flight = None;
        self.set_playing(false);
    }

    /// Play future for a ticket, or `None` if the ticket is stale
    pub fn start(&self, ticket: PlayTicket) -> Option<PlayFuture> {
        if !self.is_current(ticket) || self.in_flight != Some(ticket.attempt) {
            tracing::debug!(?ticket, "not starting stale play ticket");
            return None;
        }
        Some(self.media.play())
    }

    /// Record the host's answer to a play call
    ///
    /// `is_playing` becomes true only on success. A rejection is logged and
    /// surfaced as a [`PlaybackEvent::PlaybackRejected`]. Outcomes for stale
    /// tickets are ignored.
    pub fn complete_play(&mut self, ticket: PlayTicket, outcome: std::result::Result<(), String>) {
        if !self.is_current(ticket) || self.in_flight != Some(ticket.attempt) {
            tracing::debug!(?ticket, "discarding stale play outcome");
            return;
        }
        self.in_flight = None;

        match outcome {
            Ok(()) => {
                self.pending_restore = None;
                self.set_playing(true);
            }
            Err(reason) => {
                tracing::warn!(%reason, "playback rejected by host");
                self.set_playing(false);
                self.emit(PlaybackEvent::PlaybackRejected { reason });
            }
        }
    }

    // ===== Media events =====

    /// The media element signalled it can play (`canplay`)
    ///
    /// Re-applies a remembered offset for the current selection and releases
    /// a parked play request if it belongs to the current selection.
    pub fn on_ready(&mut self) -> Option<PlayTicket> {
        if let Some(restore) = self.pending_restore {
            if restore.generation == self.generation {
                self.media.seek(restore.seconds);
            }
            self.pending_restore = None;
        }

        match self.pending_play.take() {
            Some(attempt) if attempt == self.attempt => {
                self.in_flight = Some(attempt);
                Some(self.ticket())
            }
            Some(_) => {
                tracing::debug!("dropping parked play for a superseded attempt");
                None
            }
            None => None,
        }
    }

    /// The element paused without going through [`pause`](Self::pause)
    ///
    /// Native controls, or the host stalling. Echoes of the controller's own
    /// pauses and the pause that precedes `ended` are ignored, so auto-advance
    /// still resumes.
    pub fn on_host_paused(&mut self) {
        if !self.is_playing || !self.media.is_paused() || self.media.has_ended() {
            return;
        }
        tracing::debug!("media paused by host");
        self.attempt += 1;
        self.pending_play = None;
        self.in_flight = None;
        self.set_playing(false);
    }

    /// The element started playing without a ticket (native controls)
    ///
    /// Any parked or in-flight request is superseded: audio is already
    /// running.
    pub fn on_host_playing(&mut self) {
        if self.is_playing || self.media.is_paused() || self.media.source().is_none() {
            return;
        }
        tracing::debug!("media started by host");
        self.attempt += 1;
        self.pending_play = None;
        self.in_flight = None;
        self.set_playing(true);
    }

    /// Periodic `timeupdate`: snapshot the offset
    ///
    /// Skipped while a restore for the current selection has not landed yet
    /// (a fresh source reports 0 before the seek) and while an overridden
    /// source is loaded.
    pub fn on_time_update(&mut self) {
        if self.pending_restore.is_some() || self.source_overridden {
            return;
        }
        if let Some(track) = self.current_track() {
            let id = track.id;
            self.position.save(id, self.media.current_time());
        }
    }

    /// The active track finished: forget its offset and advance
    ///
    /// Under [`PositionScope::Global`] the shared offset is kept, so the next
    /// track is seeked to where the finished one stopped.
    pub fn on_ended(&mut self) -> Option<PlayTicket> {
        if !self.source_overridden && self.position.scope() == PositionScope::PerTrack {
            if let Some(track) = self.current_track() {
                let id = track.id;
                self.position.forget(id);
            }
        }
        self.advance_to_next()
    }

    // ===== State queries =====

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|index| self.playlist.get(index))
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether a play request is parked waiting for the ready signal
    pub fn is_waiting_for_ready(&self) -> bool {
        self.pending_play.is_some()
    }

    /// Selection generation; bumps on every source change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn position(&self) -> &PositionMemory {
        &self.position
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub(crate) fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }

    // ===== Internals =====

    /// Pause, swap the source, then restore the remembered offset
    fn load_index(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index) else {
            return;
        };
        let track_id = track.id;
        let source = track.encoded_audio.as_str().to_string();

        self.media.pause();
        self.set_playing(false);
        self.begin_selection();

        self.media.set_source(&source);
        self.current = Some(index);
        self.source_overridden = false;

        if let Err(e) = self
            .process_store
            .set(&self.track_id_key, &track_id.to_string())
        {
            tracing::warn!(error = %e, "failed to record current track id");
        }

        let restored_offset = self.position.restore(track_id);
        self.pending_restore = restored_offset.map(|seconds| {
            self.media.seek(seconds);
            PendingRestore {
                generation: self.generation,
                seconds,
            }
        });

        tracing::debug!(index, track_id, ?restored_offset, "track loaded");
        self.emit(PlaybackEvent::TrackChanged {
            index,
            track_id,
            restored_offset,
        });
    }

    fn stop_and_unload(&mut self) {
        self.media.pause();
        self.media.clear_source();
        self.set_playing(false);
        self.begin_selection();
        self.current = None;
        self.source_overridden = false;
        self.pending_restore = None;
    }

    /// Invalidate every continuation issued for the previous selection
    fn begin_selection(&mut self) {
        self.generation += 1;
        self.attempt += 1;
        self.pending_play = None;
        self.in_flight = None;
    }

    fn request_play(&mut self) -> Option<PlayTicket> {
        if self.media.source().is_none() {
            return None;
        }
        if self.in_flight.is_some() {
            return None;
        }

        if self.media.ready_state().can_play() {
            self.in_flight = Some(self.attempt);
            Some(self.ticket())
        } else {
            tracing::debug!(generation = self.generation, "media not ready, parking play");
            self.pending_play = Some(self.attempt);
            None
        }
    }

    fn wants_audio(&self) -> bool {
        self.is_playing || self.pending_play.is_some() || self.in_flight.is_some()
    }

    fn ticket(&self) -> PlayTicket {
        PlayTicket {
            generation: self.generation,
            attempt: self.attempt,
            index: if self.source_overridden {
                None
            } else {
                self.current
            },
        }
    }

    fn is_current(&self, ticket: PlayTicket) -> bool {
        ticket.generation == self.generation && ticket.attempt == self.attempt
    }

    fn set_playing(&mut self, playing: bool) {
        if self.is_playing != playing {
            self.is_playing = playing;
            self.emit(PlaybackEvent::StateChanged {
                is_playing: playing,
            });
        }
    }
}
