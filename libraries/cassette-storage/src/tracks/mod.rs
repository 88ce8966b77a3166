//! Uploaded track table
//!
//! One `songs` row per upload: `id` is assigned by `AUTOINCREMENT`, `song`
//! holds the data-URL encoded audio.

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use cassette_core::{NewTrack, PlayerConfig, Track, TrackId, TrackStore};
use sqlx::{Row, SqlitePool};

/// Insert a track and return the assigned id
pub async fn insert(pool: &SqlitePool, track: &NewTrack) -> Result<TrackId> {
    let result = sqlx::query("INSERT INTO songs (name, song) VALUES (?, ?)")
        .bind(&track.name)
        .bind(track.encoded_audio.as_str())
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Get all tracks in insertion order
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let rows = sqlx::query("SELECT id, name, song FROM songs ORDER BY id")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<Track> {
            Ok(Track {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                encoded_audio: row.try_get::<String, _>("song")?.into(),
            })
        })
        .collect()
}

/// Drop the table and the migration bookkeeping, then recreate the schema
///
/// Dropping an `AUTOINCREMENT` table also discards its `sqlite_sequence`
/// row, so ids restart at 1.
pub async fn reset(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS songs")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
        .execute(pool)
        .await?;

    crate::run_migrations(pool).await?;
    Ok(())
}

/// `SQLite`-backed track store
#[derive(Debug, Clone)]
pub struct SqliteTrackStore {
    pool: SqlitePool,
}

impl SqliteTrackStore {
    /// Open the database and apply the schema
    pub async fn open(database_url: &str) -> Result<Self> {
        let pool = crate::create_pool(database_url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        crate::run_migrations(&pool).await?;

        tracing::info!(database_url, "track store opened");
        Ok(Self { pool })
    }

    /// Open the database named by `database_url` in the player settings
    pub async fn from_config(config: &PlayerConfig) -> Result<Self> {
        Self::open(&config.database_url).await
    }

    /// Wrap a pool whose schema is already migrated
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait(?Send)]
impl TrackStore for SqliteTrackStore {
    async fn insert(&self, track: &NewTrack) -> cassette_core::Result<TrackId> {
        insert(&self.pool, track)
            .await
            .map_err(StorageError::into_write_error)
    }

    async fn list_all(&self) -> cassette_core::Result<Vec<Track>> {
        list_all(&self.pool)
            .await
            .map_err(StorageError::into_read_error)
    }

    async fn reset(&self) -> cassette_core::Result<()> {
        tracing::info!("dropping track table");
        reset(&self.pool)
            .await
            .map_err(StorageError::into_write_error)
    }
}
