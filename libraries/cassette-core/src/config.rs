/// Player configuration
use crate::error::{CassetteError, Result};
use serde::{Deserialize, Serialize};

/// Where remembered playback offsets are keyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionScope {
    /// One offset per track id (`currentTime.<id>`)
    #[default]
    PerTrack,

    /// A single offset shared by every track (`currentTime`)
    Global,
}

/// Player settings
///
/// Every field has a default, so an empty file or JS object is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Track store location for native hosts
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Per-track or shared offset memory
    #[serde(default)]
    pub position_scope: PositionScope,

    /// Session storage key for the remembered offset
    #[serde(default = "default_position_key")]
    pub position_key: String,

    /// Process storage key for the last loaded track id
    #[serde(default = "default_track_id_key")]
    pub track_id_key: String,

    /// Source assigned by the "change source" demo control
    #[serde(default = "default_change_source_placeholder")]
    pub change_source_placeholder: String,
}

fn default_database_url() -> String {
    "sqlite://cassette.db".to_string()
}

fn default_position_key() -> String {
    "currentTime".to_string()
}

fn default_track_id_key() -> String {
    "currentTrackId".to_string()
}

fn default_change_source_placeholder() -> String {
    "new-audio-source.mp3".to_string()
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            position_scope: PositionScope::default(),
            position_key: default_position_key(),
            track_id_key: default_track_id_key(),
            change_source_placeholder: default_change_source_placeholder(),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables override the file. They are prefixed with
    /// `CASSETTE_`, e.g. `CASSETTE_POSITION_SCOPE=global`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "reading player config file");
            settings = settings.add_source(config::File::from(path).required(false));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CASSETTE")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| CassetteError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CassetteError::Config(e.to_string()))?;

        config.validate()?;
        tracing::info!(
            database_url = %config.database_url,
            position_scope = ?config.position_scope,
            "player config loaded"
        );
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.check_keys().map_err(|e| {
            tracing::error!(error = %e, "invalid player config");
            e
        })
    }

    fn check_keys(&self) -> Result<()> {
        if self.position_key.trim().is_empty() {
            return Err(CassetteError::Config("position_key must not be empty".into()));
        }
        if self.track_id_key.trim().is_empty() {
            return Err(CassetteError::Config("track_id_key must not be empty".into()));
        }
        if self.position_key == self.track_id_key {
            return Err(CassetteError::Config(
                "position_key and track_id_key must differ".into(),
            ));
        }
        Ok(())
    }
}
