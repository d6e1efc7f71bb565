//! Core domain types for Encore Player

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream platform a track is streamed from.
///
/// The `id` namespace is scoped per source: a YouTube video id and a
/// SoundCloud track id may collide as strings without referring to the
/// same item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackSource {
    /// Video platform
    YouTube,
    /// Audio platform
    SoundCloud,
}

impl TrackSource {
    /// Stable string form used in persisted state and API paths
    pub fn as_str(self) -> &'static str {
        match self {
            TrackSource::YouTube => "youtube",
            TrackSource::SoundCloud => "soundcloud",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "youtube" => Some(TrackSource::YouTube),
            "soundcloud" => Some(TrackSource::SoundCloud),
            _ => None,
        }
    }
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable item.
///
/// Immutable value; all session state (queue, history, favorites) stores
/// tracks by value. Titles and artists are descriptive only — identity is
/// the `(source, id)` pair, see [`Track::key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Provider-scoped identifier (video id, track id)
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist or channel name
    pub artist: String,

    /// Duration in whole seconds
    pub duration_secs: u32,

    /// Artwork URL for display and lock-screen metadata
    pub thumbnail_url: String,

    /// Platform the track streams from
    pub source: TrackSource,
}

impl Track {
    /// Create a track with minimal metadata
    pub fn new(
        source: TrackSource,
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_secs: 0,
            thumbnail_url: String::new(),
            source,
        }
    }

    /// The track's identity: the `(source, id)` pair
    pub fn key(&self) -> TrackKey {
        TrackKey {
            source: self.source,
            id: self.id.clone(),
        }
    }

    /// Whether `other` refers to the same playable item
    pub fn same_item(&self, other: &Track) -> bool {
        self.source == other.source && self.id == other.id
    }

    /// Metadata triple for the now-playing/lock-screen surface
    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            title: self.title.clone(),
            artist: self.artist.clone(),
            artwork_url: self.thumbnail_url.clone(),
        }
    }
}

/// Track identity: the `(source, id)` pair.
///
/// Displays (and parses) as `"source:id"`, the form used for persisted
/// favorite sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackKey {
    /// Platform the id is scoped to
    pub source: TrackSource,
    /// Provider-scoped identifier
    pub id: String,
}

impl TrackKey {
    /// Parse the `"source:id"` form. Ids may themselves contain `:`.
    pub fn parse(s: &str) -> Option<Self> {
        let (source, id) = s.split_once(':')?;
        if id.is_empty() {
            return None;
        }
        Some(Self {
            source: TrackSource::parse(source)?,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Resolved streamable URL for a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamUrl {
    /// Direct playable URL
    pub url: String,
}

/// Metadata triple emitted to the notification/lock-screen surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Track title
    pub title: String,
    /// Artist name
    pub artist: String,
    /// Artwork URL
    pub artwork_url: String,
}

/// A user playlist stored server-side via [`crate::LibraryStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Server-assigned identifier
    pub id: i64,

    /// Playlist name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Number of tracks currently in the playlist
    pub track_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_source_scoped() {
        let video = Track::new(TrackSource::YouTube, "abc123", "Song", "Artist");
        let audio = Track::new(TrackSource::SoundCloud, "abc123", "Song", "Artist");

        // Same id string, different platforms: distinct items
        assert!(!video.same_item(&audio));
        assert_ne!(video.key(), audio.key());
    }

    #[test]
    fn key_display_and_parse_round_trip() {
        let key = TrackKey {
            source: TrackSource::SoundCloud,
            id: "99:88".to_string(),
        };

        let parsed = TrackKey::parse(&key.to_string()).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn key_parse_rejects_garbage() {
        assert!(TrackKey::parse("").is_none());
        assert!(TrackKey::parse("youtube").is_none());
        assert!(TrackKey::parse("youtube:").is_none());
        assert!(TrackKey::parse("vimeo:abc").is_none());
    }

    #[test]
    fn source_serializes_lowercase() {
        let json = serde_json::to_string(&TrackSource::YouTube).unwrap();
        assert_eq!(json, "\"youtube\"");

        let back: TrackSource = serde_json::from_str("\"soundcloud\"").unwrap();
        assert_eq!(back, TrackSource::SoundCloud);
    }

    #[test]
    fn now_playing_copies_metadata() {
        let mut track = Track::new(TrackSource::YouTube, "id1", "Title", "Artist");
        track.thumbnail_url = "https://img.example/1.jpg".to_string();

        let np = track.now_playing();
        assert_eq!(np.title, "Title");
        assert_eq!(np.artist, "Artist");
        assert_eq!(np.artwork_url, "https://img.example/1.jpg");
    }
}
