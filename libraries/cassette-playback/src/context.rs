//! Host services handed to the player

use cassette_core::{KeyValueStore, MediaElement, PlayerConfig, TrackStore};
use std::rc::Rc;

/// Explicitly constructed dependencies of a [`Player`](crate::Player)
///
/// Replaces ambient globals (database handle, `sessionStorage`,
/// `localStorage`, the `<audio>` element) so the whole state machine can run
/// against in-memory fakes.
#[derive(Clone)]
pub struct PlayerContext {
    /// Persistent track table
    pub store: Rc<dyn TrackStore>,

    /// Session-scoped storage (playback offsets)
    pub session: Rc<dyn KeyValueStore>,

    /// Process-scoped storage (last loaded track id)
    pub process: Rc<dyn KeyValueStore>,

    /// The single active media element
    pub media: Rc<dyn MediaElement>,

    pub config: PlayerConfig,
}

impl PlayerContext {
    /// Context with default configuration
    pub fn new(
        store: Rc<dyn TrackStore>,
        session: Rc<dyn KeyValueStore>,
        process: Rc<dyn KeyValueStore>,
        media: Rc<dyn MediaElement>,
    ) -> Self {
        Self {
            store,
            session,
            process,
            media,
            config: PlayerConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }
}
