//! Server-side library client (playlists and favorites)

use crate::error::{ProviderClientError, Result};
use crate::types::{FavoriteToggleDto, PlaylistDto, TrackDto};
use async_trait::async_trait;
use encore_core::{LibraryError, LibraryStore, Playlist, Track};
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the backend's library endpoints.
///
/// Implements [`LibraryStore`]. Used only when the user explicitly saves
/// session state into durable library objects — the session engine never
/// depends on it.
pub struct LibraryApiClient {
    http: Client,
    base_url: String,
}

impl LibraryApiClient {
    /// Create a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(ProviderClientError::InvalidUrl(
                "URL cannot be empty".into(),
            ));
        }
        let parsed =
            Url::parse(&base_url).map_err(|e| ProviderClientError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ProviderClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("EncorePlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Map a response into a library error when the status is non-success
async fn check_status(response: Response, entity: &str) -> std::result::Result<Response, LibraryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    match status {
        StatusCode::NOT_FOUND => Err(LibraryError::not_found(entity, message)),
        _ => Err(LibraryError::Rejected(format!("{status}: {message}"))),
    }
}

fn transport(err: reqwest::Error) -> LibraryError {
    LibraryError::Unavailable(err.to_string())
}

fn parse(err: reqwest::Error) -> LibraryError {
    LibraryError::Rejected(format!("unexpected response: {err}"))
}

#[async_trait]
impl LibraryStore for LibraryApiClient {
    async fn create_playlist(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> std::result::Result<Playlist, LibraryError> {
        let url = format!("{}/api/playlists", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "name": name, "description": description }))
            .send()
            .await
            .map_err(transport)?;

        let body: PlaylistDto = check_status(response, "playlist")
            .await?
            .json()
            .await
            .map_err(parse)?;

        debug!(id = body.id, name, "created playlist");
        Ok(body.into_playlist())
    }

    async fn add_track_to_playlist(
        &self,
        playlist_id: i64,
        track: &Track,
    ) -> std::result::Result<(), LibraryError> {
        let url = format!("{}/api/playlists/{playlist_id}/tracks", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TrackDto::from_track(track))
            .send()
            .await
            .map_err(transport)?;

        check_status(response, "playlist").await?;
        Ok(())
    }

    async fn list_playlists(&self) -> std::result::Result<Vec<Playlist>, LibraryError> {
        let url = format!("{}/api/playlists", self.base_url);
        let response = self.http.get(&url).send().await.map_err(transport)?;

        let body: Vec<PlaylistDto> = check_status(response, "playlists")
            .await?
            .json()
            .await
            .map_err(parse)?;

        Ok(body.into_iter().map(PlaylistDto::into_playlist).collect())
    }

    async fn list_favorites(&self) -> std::result::Result<Vec<Track>, LibraryError> {
        let url = format!("{}/api/favorites", self.base_url);
        let response = self.http.get(&url).send().await.map_err(transport)?;

        let body: Vec<TrackDto> = check_status(response, "favorites")
            .await?
            .json()
            .await
            .map_err(parse)?;

        Ok(body
            .into_iter()
            .filter(TrackDto::is_usable)
            .map(TrackDto::into_track)
            .collect())
    }

    async fn toggle_favorite(&self, track: &Track) -> std::result::Result<bool, LibraryError> {
        let url = format!("{}/api/favorites/toggle", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TrackDto::from_track(track))
            .send()
            .await
            .map_err(transport)?;

        let body: FavoriteToggleDto = check_status(response, "favorite")
            .await?
            .json()
            .await
            .map_err(parse)?;

        Ok(body.favorite)
    }
}
