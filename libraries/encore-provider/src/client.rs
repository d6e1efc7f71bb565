//! Streaming backend media client

use crate::error::{ProviderClientError, Result};
use crate::types::{StreamDto, TrackDto};
use async_trait::async_trait;
use encore_core::{MediaProvider, ProviderError, StreamError, StreamUrl, Track, TrackSource};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Per-request timeout; a hung provider must degrade, not stall playback
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the streaming backend's music endpoints.
///
/// Implements [`MediaProvider`]: searches both upstream platforms and
/// interleaves their results, and resolves track references to
/// streamable URLs. A platform that errors contributes an empty result
/// set; only a total outage surfaces as
/// [`ProviderError::Unavailable`].
pub struct StreamApiClient {
    http: Client,
    base_url: String,
}

impl StreamApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// The URL must be absolute with an `http` or `https` scheme; a
    /// trailing slash is stripped.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(&base_url.into())?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("EncorePlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// The normalized backend base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn search_platform(
        &self,
        source: TrackSource,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Track>> {
        let url = format!("{}/api/music/{}/search", self.base_url, source);
        let response = self
            .http
            .get(&url)
            .query(&[("query", query), ("limit", &limit.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let results: Vec<TrackDto> = response
            .json()
            .await
            .map_err(|e| ProviderClientError::Parse(e.to_string()))?;

        let tracks: Vec<Track> = results
            .into_iter()
            .filter(TrackDto::is_usable)
            .map(TrackDto::into_track)
            .collect();

        debug!(source = %source, query, count = tracks.len(), "platform search finished");
        Ok(tracks)
    }
}

/// Interleave two platform result lists rank by rank, video platform
/// first at each rank, capped at `limit`
fn interleave(youtube: Vec<Track>, soundcloud: Vec<Track>, limit: usize) -> Vec<Track> {
    let mut merged = Vec::with_capacity(youtube.len() + soundcloud.len());
    let mut yt = youtube.into_iter();
    let mut sc = soundcloud.into_iter();

    loop {
        let a = yt.next();
        let b = sc.next();
        if a.is_none() && b.is_none() {
            break;
        }
        merged.extend(a);
        merged.extend(b);
    }

    merged.truncate(limit);
    merged
}

fn normalize_base_url(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(ProviderClientError::InvalidUrl(
            "URL cannot be empty".into(),
        ));
    }

    let parsed =
        Url::parse(raw).map_err(|e| ProviderClientError::InvalidUrl(e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ProviderClientError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[async_trait]
impl MediaProvider for StreamApiClient {
    /// Search both platforms concurrently and interleave the results.
    ///
    /// An empty query returns an empty list without touching the
    /// network. Only a failure of both platforms is an error.
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<Track>, ProviderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let (youtube, soundcloud) = tokio::join!(
            self.search_platform(TrackSource::YouTube, query, limit),
            self.search_platform(TrackSource::SoundCloud, query, limit),
        );

        match (youtube, soundcloud) {
            (Err(yt), Err(sc)) => {
                warn!(query, youtube = %yt, soundcloud = %sc, "search failed on both platforms");
                Err(ProviderError::Unavailable(format!(
                    "youtube: {yt}; soundcloud: {sc}"
                )))
            }
            (yt, sc) => {
                if let Err(err) = &yt {
                    warn!(query, error = %err, "youtube search degraded to empty");
                }
                if let Err(err) = &sc {
                    warn!(query, error = %err, "soundcloud search degraded to empty");
                }
                Ok(interleave(
                    yt.unwrap_or_default(),
                    sc.unwrap_or_default(),
                    limit,
                ))
            }
        }
    }

    /// Resolve a track to a streamable URL.
    ///
    /// Upstream restrictions and rate limits map onto the
    /// [`StreamError`] taxonomy; anything else is `Unavailable`.
    async fn resolve_stream(
        &self,
        track: &Track,
    ) -> std::result::Result<StreamUrl, StreamError> {
        let url = format!(
            "{}/api/music/{}/stream/{}",
            self.base_url, track.source, track.id
        );

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(track = %track.key(), error = %err, "stream resolution request failed");
                return Err(StreamError::Unavailable);
            }
        };

        match response.status() {
            status if status.is_success() => {
                let body: StreamDto = response.json().await.map_err(|err| {
                    warn!(track = %track.key(), error = %err, "malformed stream response");
                    StreamError::Unavailable
                })?;
                Ok(StreamUrl { url: body.url })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(StreamError::RateLimited),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Err(StreamError::Restricted),
            status => {
                debug!(track = %track.key(), status = status.as_u16(), "stream unavailable");
                Err(StreamError::Unavailable)
            }
        }
    }
}
