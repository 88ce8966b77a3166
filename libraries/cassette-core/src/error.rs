/// Core error types for Cassette Player
use thiserror::Error;

/// Result type alias using `CassetteError`
pub type Result<T> = std::result::Result<T, CassetteError>;

/// Core error type for Cassette Player
#[derive(Error, Debug)]
pub enum CassetteError {
    /// The selected file could not be read or encoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The persistent medium rejected a write (unavailable or full)
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// The persistent medium could not be read
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// Playlist index outside `[0, len)`
    #[error("Index out of bounds: {index} (playlist length {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Playlist length at the time
        len: usize,
    },

    /// Operation not valid in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CassetteError {
    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a storage write error
    pub fn storage_write(msg: impl Into<String>) -> Self {
        Self::StorageWrite(msg.into())
    }

    /// Create a storage read error
    pub fn storage_read(msg: impl Into<String>) -> Self {
        Self::StorageRead(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error came from the persistent medium
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageWrite(_) | Self::StorageRead(_))
    }
}
