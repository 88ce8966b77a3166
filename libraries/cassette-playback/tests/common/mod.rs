//! Shared fakes for playback integration tests
//!
//! `FakeMedia` stands in for the `<audio>` element, `FakeFile` for a picked
//! file. Both record what the player did to them.

#![allow(dead_code)]

use async_trait::async_trait;
use cassette_core::{CassetteError, FileSource, MediaElement, PlayFuture, ReadyState};
use cassette_playback::{Player, PlayerConfig, PlayerContext};
use cassette_storage::{MemoryKeyValueStore, MemoryTrackStore};
use futures::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ===== Media =====

#[derive(Debug)]
struct MediaState {
    source: Option<String>,
    ready: ReadyState,
    /// Whether a freshly assigned source is immediately playable
    instant_load: bool,
    current_time: f64,
    paused: bool,
    ended: bool,
    reject_with: Option<String>,
    play_calls: usize,
    seeks: Vec<f64>,
    sources: Vec<String>,
    /// Calls made by the player, in order
    calls: Vec<&'static str>,
}

/// Scriptable media element
#[derive(Clone)]
pub struct FakeMedia {
    state: Rc<RefCell<MediaState>>,
}

impl FakeMedia {
    /// Sources load instantly; every play call succeeds
    pub fn instant() -> Self {
        Self::with_loading(true)
    }

    /// Sources stay unready until [`FakeMedia::finish_loading`]
    pub fn slow() -> Self {
        Self::with_loading(false)
    }

    fn with_loading(instant_load: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(MediaState {
                source: None,
                ready: ReadyState::HaveNothing,
                instant_load,
                current_time: 0.0,
                paused: true,
                ended: false,
                reject_with: None,
                play_calls: 0,
                seeks: Vec::new(),
                sources: Vec::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// The host buffered enough data (caller then fires `on_ready`)
    pub fn finish_loading(&self) {
        self.state.borrow_mut().ready = ReadyState::HaveEnoughData;
    }

    /// Reject subsequent play calls with `reason` (`None` to accept again)
    pub fn reject_play(&self, reason: Option<&str>) {
        self.state.borrow_mut().reject_with = reason.map(str::to_string);
    }

    /// Simulate audio advancing
    pub fn set_time(&self, seconds: f64) {
        self.state.borrow_mut().current_time = seconds;
    }

    pub fn time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub fn current_source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.state.borrow().play_calls
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.state.borrow().seeks.clone()
    }

    /// Every source ever assigned, in order
    pub fn sources(&self) -> Vec<String> {
        self.state.borrow().sources.clone()
    }

    /// Player calls (`pause`, `set_source`, `clear_source`, `seek`,
    /// `play`) in the order they happened
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// The user pressed pause on the native controls
    pub fn pause_natively(&self) {
        self.state.borrow_mut().paused = true;
    }

    /// The user pressed play on the native controls
    pub fn play_natively(&self) {
        self.state.borrow_mut().paused = false;
    }

    /// Playback reached the end; the host pauses before firing `ended`
    pub fn reach_end(&self) {
        let mut state = self.state.borrow_mut();
        state.paused = true;
        state.ended = true;
    }
}

impl MediaElement for FakeMedia {
    fn pause(&self) {
        let mut state = self.state.borrow_mut();
        state.paused = true;
        state.calls.push("pause");
    }

    fn set_source(&self, src: &str) {
        let mut state = self.state.borrow_mut();
        state.calls.push("set_source");
        state.ended = false;
        state.source = Some(src.to_string());
        state.sources.push(src.to_string());
        state.current_time = 0.0;
        state.ready = if state.instant_load {
            ReadyState::HaveEnoughData
        } else {
            ReadyState::HaveNothing
        };
    }

    fn clear_source(&self) {
        let mut state = self.state.borrow_mut();
        state.calls.push("clear_source");
        state.ended = false;
        state.source = None;
        state.current_time = 0.0;
        state.ready = ReadyState::HaveNothing;
    }

    fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready
    }

    fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn has_ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn seek(&self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.calls.push("seek");
        state.ended = false;
        state.current_time = seconds;
        state.seeks.push(seconds);
    }

    fn play(&self) -> PlayFuture {
        let mut state = self.state.borrow_mut();
        state.calls.push("play");
        state.play_calls += 1;
        let outcome = match &state.reject_with {
            Some(reason) => Err(reason.clone()),
            None => {
                state.paused = false;
                Ok(())
            }
        };
        futures::future::ready(outcome).boxed_local()
    }
}

// ===== Files =====

/// A picked file; `bytes: None` makes reading fail
pub struct FakeFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Option<Vec<u8>>,
}

impl FakeFile {
    pub fn audio(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            mime: Some("audio/mpeg".to_string()),
            bytes: Some(format!("ID3 {name}").into_bytes()),
        })
    }

    pub fn unreadable(name: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            mime: None,
            bytes: None,
        })
    }
}

#[async_trait(?Send)]
impl FileSource for FakeFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn mime_type(&self) -> Option<String> {
        self.mime.clone()
    }

    async fn read_all(&self) -> cassette_core::Result<Vec<u8>> {
        self.bytes.clone().ok_or_else(|| {
            CassetteError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "file is no longer readable",
            ))
        })
    }
}

// ===== Harness =====

/// Host services for one simulated page
pub struct Harness {
    pub store: Rc<MemoryTrackStore>,
    pub session: Rc<MemoryKeyValueStore>,
    pub process: Rc<MemoryKeyValueStore>,
    pub media: FakeMedia,
    pub config: PlayerConfig,
}

impl Harness {
    pub fn new(media: FakeMedia) -> Self {
        init_tracing();
        Self {
            store: Rc::new(MemoryTrackStore::new()),
            session: Rc::new(MemoryKeyValueStore::new()),
            process: Rc::new(MemoryKeyValueStore::new()),
            media,
            config: PlayerConfig::default(),
        }
    }

    pub fn context(&self) -> PlayerContext {
        PlayerContext::new(
            self.store.clone(),
            self.session.clone(),
            self.process.clone(),
            Rc::new(self.media.clone()),
        )
        .with_config(self.config.clone())
    }

    /// Load the page: a fresh player over the same stores
    pub async fn open(&self) -> Player {
        Player::start(self.context())
            .await
            .expect("default config is valid")
    }

    /// Stage and upload one file, driving the post-upload advance
    pub async fn upload(&self, player: &mut Player, name: &str) {
        player
            .choose_file(FakeFile::audio(name))
            .expect("pipeline idle");
        player.upload().await.expect("upload succeeds");
    }
}
