/// Boundary error types for Encore Player
use thiserror::Error;

/// Search-side provider failure.
///
/// Callers must treat this the same as an empty result set: degrade,
/// never crash playback control flow.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The upstream platform could not be reached or refused the request
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Stream resolution failure for a specific track
#[derive(Error, Debug)]
pub enum StreamError {
    /// The track no longer exists or has no playable format
    #[error("track unavailable")]
    Unavailable,

    /// The track exists but is region- or age-restricted
    #[error("track restricted")]
    Restricted,

    /// The upstream provider is rate limiting us
    #[error("provider rate limited")]
    RateLimited,
}

/// Device-scoped persistence failure (quota, I/O, corrupt value).
///
/// Persistence is best-effort: the session keeps functioning in memory
/// and these errors are logged, never surfaced to mutation callers.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The backing store rejected or failed the operation
    #[error("persistence backend error: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Server-side library (playlists/favorites) failure
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The library backend could not be reached
    #[error("library unavailable: {0}")]
    Unavailable(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"playlist"`
        entity: String,
        /// Identifier that failed to resolve
        id: String,
    },

    /// The request was rejected (auth, validation)
    #[error("library request rejected: {0}")]
    Rejected(String),
}

impl LibraryError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}
