/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Simulated or host-reported medium failure
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Database error from `SQLx`
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl StorageError {
    /// Classify as a failed write for the player
    pub fn into_write_error(self) -> cassette_core::CassetteError {
        cassette_core::CassetteError::storage_write(self.to_string())
    }

    /// Classify as a failed read for the player
    pub fn into_read_error(self) -> cassette_core::CassetteError {
        cassette_core::CassetteError::storage_read(self.to_string())
    }
}
