//! Encore Player Core
//!
//! Platform-agnostic core types, capability traits, and boundary errors
//! for Encore Player.
//!
//! This crate defines:
//! - **Domain Types**: [`Track`], [`TrackKey`], [`TrackSource`], [`Playlist`]
//! - **Capability Traits**: [`MediaProvider`] (search and stream
//!   resolution), [`PersistenceAdapter`] (device-scoped key/value state),
//!   [`LibraryStore`] (server-side playlists and favorites)
//! - **Boundary Errors**: [`ProviderError`], [`StreamError`],
//!   [`PersistenceError`], [`LibraryError`]
//!
//! # Architecture
//!
//! `encore-core` has no I/O of its own. The session engine
//! (`encore-session`) consumes the capability traits; `encore-storage`
//! and `encore-provider` implement them. Everything that crosses a
//! process or network boundary is expressed here so the engine never
//! depends on a concrete backend.
//!
//! # Example
//!
//! ```rust
//! use encore_core::{Track, TrackSource};
//!
//! let track = Track::new(TrackSource::YouTube, "dQw4w9WgXcQ", "Some Song", "Some Artist");
//!
//! // Identity is the (source, id) pair, not the id string alone.
//! let key = track.key();
//! assert_eq!(key.to_string(), "youtube:dQw4w9WgXcQ");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LibraryError, PersistenceError, ProviderError, StreamError};
pub use traits::{LibraryStore, MediaProvider, PersistenceAdapter};
pub use types::{NowPlaying, Playlist, StreamUrl, Track, TrackKey, TrackSource};
