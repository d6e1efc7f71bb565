//! Session events
//!
//! Event-based communication for UI and now-playing-surface
//! synchronization. Events are queued by the engine during each mutation
//! and broadcast by the session service after the mutation's state has
//! been persisted.

use crate::types::RepeatMode;
use encore_core::{NowPlaying, Track, TrackKey};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A track became the now-playing item.
    ///
    /// Carries the metadata triple for lock-screen/notification
    /// integrations; the external audio layer starts streaming this
    /// track in response.
    TrackStarted {
        /// The track now playing
        track: Track,
        /// Title/artist/artwork for the now-playing surface
        now_playing: NowPlaying,
    },

    /// Playback must stop (queue cleared, emptied, or sleep timer fired).
    /// The queue itself is only cleared by an explicit clear.
    PlaybackStopped,

    /// Queue contents changed (added/removed/reordered/cleared)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Shuffle was toggled
    ShuffleChanged {
        /// New shuffle state
        enabled: bool,
    },

    /// Repeat mode cycled
    RepeatChanged {
        /// New repeat mode
        mode: RepeatMode,
    },

    /// Radio mode was toggled
    RadioModeChanged {
        /// New radio state
        enabled: bool,
    },

    /// Radio replenishment appended tracks
    RadioTracksAdded {
        /// Number of tracks appended
        count: usize,
    },

    /// Sleep timer was armed or disarmed by the user
    SleepTimerSet {
        /// Seconds remaining, `None` when disarmed
        remaining_secs: Option<u32>,
    },

    /// One second elapsed on the armed sleep timer
    SleepTimerTick {
        /// Seconds remaining
        remaining_secs: u32,
    },

    /// The sleep timer ran out; a `PlaybackStopped` accompanies this
    SleepTimerExpired,

    /// A track's favorite flag flipped
    FavoriteChanged {
        /// Identity of the affected track
        key: TrackKey,
        /// New favorite state
        favorite: bool,
    },

    /// Playback rate changed
    PlaybackSpeedChanged {
        /// New rate multiplier
        speed: f32,
    },
}
