/// Capability traits for Encore Player
use crate::error::{LibraryError, PersistenceError, ProviderError, StreamError};
use crate::types::{Playlist, StreamUrl, Track};
use async_trait::async_trait;
use serde_json::Value;

/// External media capability: search and stream resolution.
///
/// Implementations own all network concerns — timeouts, retries, rate
/// limiting. Callers treat [`ProviderError`] and an empty result list
/// identically ("nothing found") and never let either interrupt playback
/// control flow.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Search for playable tracks.
    ///
    /// Returns at most `limit` results. An empty list is a normal
    /// outcome, not an error.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Track>, ProviderError>;

    /// Resolve a track reference into a directly streamable URL.
    async fn resolve_stream(&self, track: &Track) -> Result<StreamUrl, StreamError>;
}

/// Durable device-scoped key/value store for JSON-serializable state.
///
/// Each key is independently readable and writable so corruption of one
/// persisted value never invalidates the others. All writes originate
/// from the session's single-writer context; last-write-wins per key is
/// sufficient.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Value) -> Result<(), PersistenceError>;

    /// Delete the value stored under `key`, if any
    async fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Server-side durable library: playlists and favorites.
///
/// Only exercised when the user explicitly saves session state into
/// durable library objects; the session engine never requires this to
/// function offline.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Create a new playlist
    async fn create_playlist(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Playlist, LibraryError>;

    /// Append a track to an existing playlist
    async fn add_track_to_playlist(
        &self,
        playlist_id: i64,
        track: &Track,
    ) -> Result<(), LibraryError>;

    /// List the user's playlists
    async fn list_playlists(&self) -> Result<Vec<Playlist>, LibraryError>;

    /// List the user's favorite tracks
    async fn list_favorites(&self) -> Result<Vec<Track>, LibraryError>;

    /// Toggle a track's favorite flag; returns the new state
    async fn toggle_favorite(&self, track: &Track) -> Result<bool, LibraryError>;
}
