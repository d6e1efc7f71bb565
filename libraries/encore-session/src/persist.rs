//! Session persistence
//!
//! Each piece of session state lives under its own key so partial
//! corruption of one value never invalidates the others. The engine
//! marks keys dirty as mutations touch them; the service encodes and
//! writes the dirty keys after each mutation, in mutation order.
//! Restore reads every key independently, logging and skipping anything
//! unreadable.

use crate::engine::SessionEngine;
use encore_core::{PersistenceAdapter, Track, TrackKey};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Persistence keys, one per independently stored piece of state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    /// Queue contents, in play order
    Queue,

    /// The now-playing track (identity fallback when the index is
    /// unusable)
    CurrentTrack,

    /// Queue pointer, `-1` when nothing is selected
    CurrentIndex,

    /// Favorite identities as `"source:id"` strings
    Favorites,

    /// Recent search queries, most recent first
    RecentSearches,

    /// Play history, most recent first
    PlayHistory,

    /// Playback rate multiplier
    PlaybackSpeed,
}

impl StateKey {
    /// All keys, in the order restore reads them
    pub const ALL: [StateKey; 7] = [
        StateKey::Queue,
        StateKey::CurrentTrack,
        StateKey::CurrentIndex,
        StateKey::Favorites,
        StateKey::RecentSearches,
        StateKey::PlayHistory,
        StateKey::PlaybackSpeed,
    ];

    /// The storage key string
    pub fn as_str(self) -> &'static str {
        match self {
            StateKey::Queue => "queue",
            StateKey::CurrentTrack => "current-track",
            StateKey::CurrentIndex => "current-index",
            StateKey::Favorites => "favorites",
            StateKey::RecentSearches => "recent-searches",
            StateKey::PlayHistory => "play-history",
            StateKey::PlaybackSpeed => "playback-speed",
        }
    }
}

/// Encode the engine state stored under `key`
pub(crate) fn encode_key(engine: &SessionEngine, key: StateKey) -> serde_json::Result<Value> {
    match key {
        StateKey::Queue => serde_json::to_value(engine.queue().items()),
        StateKey::CurrentTrack => serde_json::to_value(engine.current_track()),
        StateKey::CurrentIndex => {
            let index = engine
                .current_index()
                .map_or(-1, |i| i64::try_from(i).unwrap_or(-1));
            Ok(Value::from(index))
        }
        StateKey::Favorites => {
            let mut keys: Vec<String> = engine.favorites().iter().map(TrackKey::to_string).collect();
            keys.sort();
            serde_json::to_value(keys)
        }
        StateKey::RecentSearches => serde_json::to_value(engine.recent_searches().entries()),
        StateKey::PlayHistory => serde_json::to_value(engine.history().entries()),
        StateKey::PlaybackSpeed => serde_json::to_value(engine.playback_speed()),
    }
}

/// Load persisted state into a fresh engine.
///
/// Every key is read independently; unreadable values are logged and
/// skipped so one corrupt key costs only its own state.
pub(crate) async fn restore_engine(engine: &mut SessionEngine, adapter: &dyn PersistenceAdapter) {
    let items: Vec<Track> = read_key(adapter, StateKey::Queue).await.unwrap_or_default();
    let index: Option<i64> = read_key(adapter, StateKey::CurrentIndex).await;
    let current = index.and_then(|i| usize::try_from(i).ok());
    engine.restore_queue(items, current);

    // The stored index was -1, out of range, or corrupt: fall back to
    // locating the stored current track by identity.
    if engine.current_index().is_none() && !engine.queue().is_empty() {
        if let Some(track) = read_key::<Option<Track>>(adapter, StateKey::CurrentTrack)
            .await
            .flatten()
        {
            engine.restore_current_by_key(&track.key());
        }
    }

    if let Some(stored) = read_key::<Vec<String>>(adapter, StateKey::Favorites).await {
        let favorites = stored
            .iter()
            .filter_map(|s| {
                let parsed = TrackKey::parse(s);
                if parsed.is_none() {
                    warn!(entry = %s, "skipping unparseable favorite");
                }
                parsed
            })
            .collect();
        engine.restore_favorites(favorites);
    }

    if let Some(searches) = read_key(adapter, StateKey::RecentSearches).await {
        engine.restore_searches(searches);
    }

    if let Some(history) = read_key(adapter, StateKey::PlayHistory).await {
        engine.restore_history(history);
    }

    if let Some(speed) = read_key::<f32>(adapter, StateKey::PlaybackSpeed).await {
        engine.restore_playback_speed(speed);
    }
}

async fn read_key<T: DeserializeOwned>(
    adapter: &dyn PersistenceAdapter,
    key: StateKey,
) -> Option<T> {
    match adapter.get(key.as_str()).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "ignoring corrupt persisted value");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!(key = key.as_str(), error = %err, "failed to read persisted value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_strings_are_stable() {
        let strings: Vec<&str> = StateKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            strings,
            vec![
                "queue",
                "current-track",
                "current-index",
                "favorites",
                "recent-searches",
                "play-history",
                "playback-speed",
            ]
        );
    }

    #[test]
    fn current_index_encodes_idle_as_minus_one() {
        let engine = SessionEngine::default();
        let value = encode_key(&engine, StateKey::CurrentIndex).unwrap();
        assert_eq!(value, Value::from(-1));
    }
}
