//! Encore Player - Streaming Backend Client
//!
//! HTTP implementations of the Encore capability traits against the
//! streaming backend:
//!
//! - [`StreamApiClient`]: [`MediaProvider`](encore_core::MediaProvider) —
//!   track search across both upstream platforms and stream-URL
//!   resolution
//! - [`LibraryApiClient`]: [`LibraryStore`](encore_core::LibraryStore) —
//!   server-side playlists and favorites
//!
//! # Degradation contract
//!
//! The session engine must never crash or hang on provider trouble, so
//! this crate owns the ugly parts: request timeouts, platform outages
//! (a platform that errors contributes an empty result set), and
//! upstream rate limiting (HTTP 429 maps to
//! [`StreamError::RateLimited`](encore_core::StreamError)).
//!
//! # Example
//!
//! ```ignore
//! use encore_provider::StreamApiClient;
//!
//! let client = StreamApiClient::new("https://encore.example.com")?;
//! let results = client.search("artist song", 5).await?;
//! ```

#![forbid(unsafe_code)]

mod client;
mod error;
mod library;
mod types;

pub use client::StreamApiClient;
pub use error::{ProviderClientError, Result};
pub use library::LibraryApiClient;
