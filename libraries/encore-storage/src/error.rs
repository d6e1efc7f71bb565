/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for encore_core::PersistenceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Serialization(e) => encore_core::PersistenceError::Serialization(e),
            other => encore_core::PersistenceError::Backend(other.to_string()),
        }
    }
}
