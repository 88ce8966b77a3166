//! Cassette Player Storage
//!
//! Track store and key-value storage backends for Cassette Player.
//!
//! # Backends
//!
//! - **`SqliteTrackStore`** (feature `sqlite`, default): the `songs` table in
//!   a `SQLite` database, reached through a single-connection pool
//! - **`MemoryTrackStore`**: volatile store with failure injection, used by
//!   tests and as a fallback when no persistent medium is available
//! - **`KeyValueTrackStore`**: the `songs` table as a JSON array inside any
//!   key-value store (the browser host puts it in `localStorage`)
//! - **`MemoryKeyValueStore`**: in-process stand-in for session/local storage
//!
//! The `web-sys` key-value adapters live in the web host.
//!
//! # Example
//!
//! ```rust,no_run
//! use cassette_core::{EncodedAudio, NewTrack, TrackStore};
//! use cassette_storage::SqliteTrackStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteTrackStore::open("sqlite://cassette.db").await?;
//!
//! let id = store
//!     .insert(&NewTrack::new("song1.mp3", EncodedAudio::encode("audio/mpeg", b"...")))
//!     .await?;
//! let tracks = store.list_all().await?;
//! assert_eq!(tracks.last().map(|t| t.id), Some(id));
//! # Ok(())
//! # }
//! ```

mod error;
mod key_value;
mod key_value_tracks;
mod memory;

#[cfg(feature = "sqlite")]
pub mod tracks;

pub use error::StorageError;
pub use key_value::MemoryKeyValueStore;
pub use key_value_tracks::{KeyValueTrackStore, NEXT_ID_KEY, SONGS_KEY};
pub use memory::MemoryTrackStore;

#[cfg(feature = "sqlite")]
pub use tracks::SqliteTrackStore;

#[cfg(feature = "sqlite")]
use sqlx::{migrate::Migrator, sqlite::SqlitePool};

// Embed migrations into binary
#[cfg(feature = "sqlite")]
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Called once at startup, and again after a reset has dropped the schema.
///
/// # Errors
///
/// Returns an error if migrations fail to run
#[cfg(feature = "sqlite")]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// The pool holds exactly one connection for the lifetime of the process:
/// the player opens the store once, and a `sqlite::memory:` database only
/// lives as long as its connection.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://cassette.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
#[cfg(feature = "sqlite")]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(database_url, "creating track store pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    tracing::debug!("track store pool ready");

    Ok(pool)
}
