//! Wire types for the streaming backend API

use encore_core::{Playlist, Track, TrackSource};
use serde::{Deserialize, Serialize};

/// A track as the backend serializes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TrackDto {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub artist: String,

    /// Duration in whole seconds
    #[serde(default)]
    pub duration: u32,

    #[serde(default)]
    pub thumbnail: String,

    pub source: TrackSource,
}

impl TrackDto {
    /// Results without an id or title are unusable; the backend filters
    /// most of these but upstream scrapes occasionally leak empties.
    pub(crate) fn is_usable(&self) -> bool {
        !self.id.is_empty() && !self.title.is_empty()
    }

    pub(crate) fn into_track(self) -> Track {
        Track {
            id: self.id,
            title: self.title,
            artist: self.artist,
            duration_secs: self.duration,
            thumbnail_url: self.thumbnail,
            source: self.source,
        }
    }

    pub(crate) fn from_track(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration: track.duration_secs,
            thumbnail: track.thumbnail_url.clone(),
            source: track.source,
        }
    }
}

/// Stream resolution response body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StreamDto {
    pub url: String,
}

/// A playlist as the backend serializes it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub track_count: u32,
}

impl PlaylistDto {
    pub(crate) fn into_playlist(self) -> Playlist {
        Playlist {
            id: self.id,
            name: self.name,
            description: self.description,
            track_count: self.track_count,
        }
    }
}

/// Toggle-favorite response body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FavoriteToggleDto {
    pub favorite: bool,
}
