//! Client-side error types

use thiserror::Error;

/// Result type alias using `ProviderClientError`
pub type Result<T> = std::result::Result<T, ProviderClientError>;

/// Errors raised by the backend HTTP clients.
///
/// These are internal; the capability trait implementations map them to
/// the boundary errors the session engine understands.
#[derive(Error, Debug)]
pub enum ProviderClientError {
    /// The configured base URL is unusable
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Parse(String),
}
