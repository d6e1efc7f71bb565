//! Error types for session operations

use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Queue mutation with an out-of-range index.
    ///
    /// A programming error on the caller's side: the store fails loudly
    /// rather than clamping, which would hide the bug.
    #[error("index out of bounds: {0}")]
    InvalidIndex(usize),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
