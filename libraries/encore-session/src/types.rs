//! Core types for the playback session

use encore_core::Track;
use serde::{Deserialize, Serialize};

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the queue ends
    #[default]
    Off,

    /// Wrap from the end of the queue back to the start
    All,

    /// Replay the current track indefinitely
    One,
}

impl RepeatMode {
    /// The next mode in the user-facing cycle: off, all, one, off, ...
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// Whether a track is currently selected for playback.
///
/// `Idle` means nothing is selected (`current_index` is `None`); `Active`
/// means the queue pointer addresses a track. Entering `Active` records a
/// history entry and notifies the now-playing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track selected
    Idle,

    /// A track is selected and treated as now playing
    Active,
}

/// Configuration for the session engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum play-history size (default: 50)
    pub history_size: usize,

    /// Maximum recent-search entries (default: 10)
    pub recent_search_size: usize,

    /// Radio refill triggers when fewer unplayed tracks than this remain
    /// after the current one (default: 3)
    pub radio_low_water: usize,

    /// How many related tracks to request per radio fetch (default: 5)
    pub radio_fetch_limit: usize,

    /// Maximum tracks appended per radio fetch (default: 3)
    pub radio_append_max: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_size: 50,
            recent_search_size: 10,
            radio_low_water: 3,
            radio_fetch_limit: 5,
            radio_append_max: 3,
        }
    }
}

/// Observable snapshot of the session for consumers to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Queue contents in play order
    pub queue: Vec<Track>,

    /// Current position in the queue, if any
    pub current_index: Option<usize>,

    /// The track at `current_index`
    pub current_track: Option<Track>,

    /// Idle/Active
    pub state: PlaybackState,

    /// Whether shuffle is enabled
    pub shuffle: bool,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Whether radio auto-replenishment is enabled
    pub radio_mode: bool,

    /// Seconds until the sleep timer stops playback, if armed
    pub sleep_remaining_secs: Option<u32>,

    /// Playback rate multiplier (1.0 = normal)
    pub playback_speed: f32,

    /// Whether a next track is reachable from here
    pub has_next: bool,

    /// Whether a previous track is reachable from here
    pub has_previous: bool,
}
