//! Upload pipeline
//!
//! ```text
//! Idle -> FileSelected -> Encoding -> Persisting -> Appended
//!                             |            |
//!                             v            v
//!                           Idle         Failed
//! ```
//!
//! Choosing a file only stages it; the user confirms separately. The async
//! part (read + encode + insert) runs in an [`UploadJob`] that owns its
//! inputs, so a single-threaded host does not hold the player across the
//! suspension points.

use cassette_core::{
    CassetteError, EncodedAudio, FileSource, NewTrack, Result, Track, TrackId, TrackStore,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Pipeline state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    /// No file staged
    #[default]
    Idle,
    /// A file is staged, waiting for confirmation
    FileSelected,
    /// Reading and encoding the file
    Encoding,
    /// Writing the encoded record to the store
    Persisting,
    /// Stored and appended to the playlist
    Appended(TrackId),
    /// The store rejected the record; the message was shown to the user
    Failed(String),
}

impl UploadState {
    /// Whether a job is running
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Encoding | Self::Persisting)
    }
}

/// Stages a file and tracks the state of its upload
#[derive(Default)]
pub struct UploadPipeline {
    state: Rc<RefCell<UploadState>>,
    file: Option<Rc<dyn FileSource>>,
}

impl fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("state", &*self.state.borrow())
            .field("file", &self.file.as_ref().map(|file| file.name()))
            .finish()
    }
}

impl UploadPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    /// Name of the staged file
    pub fn staged_file(&self) -> Option<String> {
        self.file.as_ref().map(|file| file.name())
    }

    /// Stage a file chosen in the picker
    pub fn select_file(&mut self, file: Rc<dyn FileSource>) -> Result<()> {
        if self.state.borrow().is_busy() {
            return Err(CassetteError::invalid_operation("upload in progress"));
        }
        tracing::debug!(name = %file.name(), "file staged for upload");
        self.file = Some(file);
        self.set_state(UploadState::FileSelected);
        Ok(())
    }

    /// User confirmed: start encoding the staged file
    ///
    /// A staged file stays staged after a storage failure or a success, so
    /// confirming again retries with the same file.
    pub fn begin(&mut self, store: Rc<dyn TrackStore>) -> Result<UploadJob> {
        if self.state.borrow().is_busy() {
            return Err(CassetteError::invalid_operation("upload in progress"));
        }
        let file = self
            .file
            .clone()
            .ok_or_else(|| CassetteError::invalid_operation("no file selected"))?;

        self.set_state(UploadState::Encoding);
        Ok(UploadJob {
            file,
            store,
            state: Rc::clone(&self.state),
        })
    }

    /// Apply a finished job's outcome
    ///
    /// Encoding failures return to `Idle` and unstage the file; storage
    /// failures land in `Failed`. The outcome is passed through.
    pub fn finish(&mut self, outcome: Result<Track>) -> Result<Track> {
        match &outcome {
            Ok(track) => self.set_state(UploadState::Appended(track.id)),
            Err(CassetteError::Encoding(_)) => {
                self.file = None;
                self.set_state(UploadState::Idle);
            }
            Err(e) => self.set_state(UploadState::Failed(e.to_string())),
        }
        outcome
    }

    /// Back to `Idle` with nothing staged
    pub fn reset(&mut self) {
        self.file = None;
        self.set_state(UploadState::Idle);
    }

    fn set_state(&self, state: UploadState) {
        *self.state.borrow_mut() = state;
    }
}

/// One confirmed upload: read, encode, insert
#[must_use = "an upload job does nothing until run"]
pub struct UploadJob {
    file: Rc<dyn FileSource>,
    store: Rc<dyn TrackStore>,
    state: Rc<RefCell<UploadState>>,
}

impl UploadJob {
    /// Run the job to completion
    ///
    /// Read failures come back as `CassetteError::Encoding`; store failures as
    /// `CassetteError::StorageWrite`. Hand the result to
    /// [`UploadPipeline::finish`].
    pub async fn run(self) -> Result<Track> {
        let name = self.file.name();
        let mime = self.file.mime_type();

        let bytes = self.file.read_all().await.map_err(|e| match e {
            CassetteError::Encoding(_) => e,
            other => CassetteError::encoding(format!("cannot read {name}: {other}")),
        })?;
        let encoded = EncodedAudio::from_file(&name, mime.as_deref(), &bytes);
        drop(bytes);

        *self.state.borrow_mut() = UploadState::Persisting;

        let track = NewTrack::new(name, encoded);
        let id = self.store.insert(&track).await?;

        tracing::info!(id, name = %track.name, "track stored");
        Ok(Track::from_new(id, track))
    }
}
