//! JavaScript-facing player
//!
//! Wraps the core `Player` with a `wasm-bindgen` API. Every call takes the
//! `RefCell` borrow for one synchronous step only; host promises (file reads,
//! `audio.play()`) are awaited in `spawn_local` tasks holding a weak handle,
//! and their outcome is fed back in a fresh borrow.

use crate::{
    file::BrowserFile,
    indexed_db::{IndexedDbTrackStore, DATABASE_NAME},
    media::HtmlAudioMedia,
    storage::{local_track_store, BrowserStorage},
};
use cassette_core::{CassetteError, PlayerConfig, TrackStore};
use cassette_playback::{PlayTicket, PlaybackEvent, Player, PlayerContext, UploadState};
use js_sys::{Function, Promise};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::HtmlAudioElement;

/// Playlist entry as seen from JavaScript (no audio payload)
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct TrackView {
    id: i64,
    name: String,
}

/// A registered media event listener, removed on drop
struct Listener {
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

struct Shared {
    player: RefCell<Player>,
    audio: HtmlAudioElement,
    on_change: RefCell<Option<Function>>,
    listeners: RefCell<Vec<Listener>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        for listener in self.listeners.get_mut().drain(..) {
            let _ = self.audio.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

impl Shared {
    /// Hand queued events to the page
    ///
    /// The player borrow is released before the callback runs, so the
    /// callback may query the player.
    fn flush(&self) {
        let events = self.player.borrow_mut().drain_events();
        if events.is_empty() {
            return;
        }

        for event in &events {
            match event {
                PlaybackEvent::PlaybackRejected { reason } => {
                    web_sys::console::warn_1(&format!("Playback rejected: {reason}").into());
                }
                PlaybackEvent::Error { message } => {
                    web_sys::console::error_1(&message.into());
                }
                _ => {}
            }
        }

        let callback = self.on_change.borrow().clone();
        if let Some(callback) = callback {
            match serde_wasm_bindgen::to_value(&events) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        web_sys::console::error_2(&JsValue::from_str("onChange callback threw"), &e);
                    }
                }
                Err(e) => web_sys::console::error_1(&e.to_string().into()),
            }
        }
    }

    /// Start the play call for a ticket and report its outcome later
    fn drive(self: &Rc<Self>, ticket: Option<PlayTicket>) {
        let Some(ticket) = ticket else {
            return;
        };
        let Some(play) = self.player.borrow().start_play(ticket) else {
            return;
        };

        let weak = Rc::downgrade(self);
        spawn_local(async move {
            let outcome = play.await;
            if let Some(shared) = weak.upgrade() {
                shared.player.borrow_mut().complete_play(ticket, outcome);
                shared.flush();
            }
        });
    }

    fn listen(self: &Rc<Self>, event: &'static str, handler: fn(&Rc<Self>)) -> Result<(), JsValue> {
        let weak: Weak<Self> = Rc::downgrade(self);
        let callback = Closure::wrap(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                handler(&shared);
            }
        }) as Box<dyn FnMut()>);

        self.audio
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        self.listeners
            .borrow_mut()
            .push(Listener { event, callback });
        Ok(())
    }

    fn on_time_update(self: &Rc<Self>) {
        self.player.borrow_mut().on_time_update();
    }

    fn on_can_play(self: &Rc<Self>) {
        let ticket = self.player.borrow_mut().on_ready();
        self.drive(ticket);
        self.flush();
    }

    fn on_pause(self: &Rc<Self>) {
        self.player.borrow_mut().on_host_paused();
        self.flush();
    }

    fn on_playing(self: &Rc<Self>) {
        self.player.borrow_mut().on_host_playing();
        self.flush();
    }

    fn on_ended(self: &Rc<Self>) {
        let ticket = self.player.borrow_mut().on_ended();
        self.drive(ticket);
        self.flush();
    }
}

/// Blocking notification, as the page has no error banner
fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn to_js(error: &CassetteError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// IndexedDB, or `localStorage` where the browser withholds it
fn browser_track_store() -> Rc<dyn TrackStore> {
    match IndexedDbTrackStore::new(DATABASE_NAME) {
        Some(store) => Rc::new(store),
        None => {
            web_sys::console::warn_1(&JsValue::from_str(
                "IndexedDB unavailable, keeping tracks in localStorage",
            ));
            Rc::new(local_track_store())
        }
    }
}

/// Browser audio player
#[wasm_bindgen]
pub struct WasmPlayer {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player bound to an `<audio>` element
    ///
    /// `config` is an optional object with `PlayerConfig` fields. The
    /// playlist is read from IndexedDB right away; `onChange` receives a
    /// `playlistChanged` event once it is loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(audio: HtmlAudioElement, config: JsValue) -> Result<WasmPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid player config: {e}")))?
        };

        let context = PlayerContext::new(
            browser_track_store(),
            Rc::new(BrowserStorage::Session),
            Rc::new(BrowserStorage::Local),
            Rc::new(HtmlAudioMedia::new(audio.clone())),
        )
        .with_config(config);
        let player = Player::new(context).map_err(|e| to_js(&e))?;

        let shared = Rc::new(Shared {
            player: RefCell::new(player),
            audio,
            on_change: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        shared.listen("timeupdate", Shared::on_time_update)?;
        shared.listen("canplay", Shared::on_can_play)?;
        shared.listen("ended", Shared::on_ended)?;
        shared.listen("pause", Shared::on_pause)?;
        shared.listen("playing", Shared::on_playing)?;

        let weak = Rc::downgrade(&shared);
        spawn_local(async move {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let store = shared.player.borrow().store();
            drop(shared);

            let loaded = store.list_all().await;
            if let Some(shared) = weak.upgrade() {
                shared.player.borrow_mut().restore_playlist(loaded);
                shared.flush();
            }
        });

        Ok(Self { shared })
    }

    // ===== Upload =====

    /// Stage the file picked in the file input
    #[wasm_bindgen(js_name = chooseFile)]
    pub fn choose_file(&self, file: web_sys::File) -> Result<(), JsValue> {
        self.shared
            .player
            .borrow_mut()
            .choose_file(Rc::new(BrowserFile::new(file)))
            .map_err(|e| to_js(&e))
    }

    /// Encode and store the staged file
    ///
    /// Resolves with the new `{id, name}` entry. Failures are alerted and
    /// the promise rejects with the message.
    pub fn upload(&self) -> Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let job = shared.player.borrow_mut().begin_upload();
            let job = match job {
                Ok(job) => job,
                Err(e) => {
                    shared.flush();
                    alert(&e.to_string());
                    return Err(to_js(&e));
                }
            };

            let outcome = job.run().await;
            let finished = shared.player.borrow_mut().finish_upload(outcome);
            match finished {
                Ok(uploaded) => {
                    shared.drive(uploaded.ticket);
                    shared.flush();
                    let view = TrackView {
                        id: uploaded.track.id,
                        name: uploaded.track.name,
                    };
                    serde_wasm_bindgen::to_value(&view).map_err(JsValue::from)
                }
                Err(e) => {
                    shared.flush();
                    alert(&e.to_string());
                    Err(to_js(&e))
                }
            }
        })
    }

    /// Wipe the store and start over with an empty playlist
    pub fn reset(&self) -> Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let store = shared.player.borrow().store();
            let outcome = store.reset().await;
            let wiped = shared.player.borrow_mut().finish_reset(outcome);
            if let Err(e) = wiped {
                shared.flush();
                return Err(to_js(&e));
            }

            let loaded = store.list_all().await;
            shared.player.borrow_mut().restore_playlist(loaded);
            shared.flush();
            Ok(JsValue::UNDEFINED)
        })
    }

    // ===== Playback Control =====

    /// Playlist item clicked
    #[wasm_bindgen(js_name = selectTrack)]
    pub fn select_track(&self, index: usize) -> Result<(), JsValue> {
        let ticket = self.shared.player.borrow_mut().play_track(index);
        let ticket = ticket.map_err(|e| to_js(&e))?;
        self.shared.drive(ticket);
        self.shared.flush();
        Ok(())
    }

    #[wasm_bindgen(js_name = nextTrack)]
    pub fn next_track(&self) {
        let ticket = self.shared.player.borrow_mut().next_track();
        self.shared.drive(ticket);
        self.shared.flush();
    }

    /// Point the element at the configured placeholder source
    #[wasm_bindgen(js_name = changeSource)]
    pub fn change_source(&self) {
        let ticket = self.shared.player.borrow_mut().change_source();
        self.shared.drive(ticket);
        self.shared.flush();
    }

    pub fn play(&self) {
        let ticket = self.shared.player.borrow_mut().play();
        self.shared.drive(ticket);
        self.shared.flush();
    }

    pub fn pause(&self) {
        self.shared.player.borrow_mut().pause();
        self.shared.flush();
    }

    // ===== State Queries =====

    /// Playlist as `[{id, name}]`
    pub fn tracks(&self) -> JsValue {
        let tracks: Vec<TrackView> = self
            .shared
            .player
            .borrow()
            .playlist()
            .iter()
            .map(|track| TrackView {
                id: track.id,
                name: track.name.clone(),
            })
            .collect();

        serde_wasm_bindgen::to_value(&tracks).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<usize> {
        self.shared.player.borrow().current_index()
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.shared.player.borrow().is_playing()
    }

    /// Name of the loaded track
    #[wasm_bindgen(js_name = nowPlaying)]
    pub fn now_playing(&self) -> Option<String> {
        self.shared
            .player
            .borrow()
            .now_playing()
            .map(str::to_string)
    }

    /// "idle" | "fileSelected" | "encoding" | "persisting" | "appended" | "failed"
    #[wasm_bindgen(js_name = uploadState)]
    pub fn upload_state(&self) -> String {
        match self.shared.player.borrow().upload_state() {
            UploadState::Idle => "idle",
            UploadState::FileSelected => "fileSelected",
            UploadState::Encoding => "encoding",
            UploadState::Persisting => "persisting",
            UploadState::Appended(_) => "appended",
            UploadState::Failed(_) => "failed",
        }
        .to_string()
    }

    // ===== Event Listeners =====

    /// Register the change callback; it receives an array of events
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Function) {
        *self.shared.on_change.borrow_mut() = Some(callback);
    }
}
