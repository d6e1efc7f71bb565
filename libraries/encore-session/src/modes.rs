//! Shuffle and repeat semantics layered over the queue
//!
//! The modes controller owns the shuffle flag and repeat mode and decides
//! what "next" and "previous" resolve to at the queue boundaries. Shuffle
//! reorders the queue items; repeat only affects boundary resolution.

use crate::queue::TrackQueue;
use crate::types::RepeatMode;
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Where navigation lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Navigation {
    /// Re-signal the current track without moving the pointer (repeat-one)
    Replay,

    /// Move the pointer to this index
    MoveTo(usize),

    /// Nothing to do (at a boundary with no wrap)
    Stay,
}

/// Shuffle flag and repeat mode
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PlaybackModes {
    pub(crate) shuffle: bool,
    pub(crate) repeat: RepeatMode,
}

impl PlaybackModes {
    /// Flip shuffle, reordering (or restoring) the queue. Returns the new
    /// state.
    pub(crate) fn toggle_shuffle(&mut self, queue: &mut TrackQueue) -> bool {
        if self.shuffle {
            disable_shuffle(queue);
            self.shuffle = false;
        } else {
            enable_shuffle(queue);
            self.shuffle = true;
        }
        self.shuffle
    }

    /// Advance the repeat mode one step in its cycle
    pub(crate) fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    /// Whether a next track is reachable
    pub(crate) fn has_next(&self, queue: &TrackQueue) -> bool {
        let forward = match queue.current_index() {
            Some(i) => i + 1 < queue.len(),
            None => !queue.is_empty(),
        };
        forward || (self.repeat == RepeatMode::All && !queue.is_empty())
    }

    /// Whether a previous track is reachable. Previous never wraps:
    /// "go back" is distinct from "restart the album".
    pub(crate) fn has_previous(&self, queue: &TrackQueue) -> bool {
        matches!(queue.current_index(), Some(i) if i > 0)
    }

    /// Resolve a forward step.
    ///
    /// Repeat-one re-signals the same track (restart the identical item,
    /// pointer untouched). Repeat-all wraps past the end to index 0.
    pub(crate) fn resolve_next(&self, queue: &TrackQueue) -> Navigation {
        if queue.is_empty() {
            return Navigation::Stay;
        }

        if self.repeat == RepeatMode::One && queue.current_index().is_some() {
            return Navigation::Replay;
        }

        match queue.current_index() {
            Some(i) if i + 1 < queue.len() => Navigation::MoveTo(i + 1),
            None => Navigation::MoveTo(0),
            Some(_) if self.repeat == RepeatMode::All => Navigation::MoveTo(0),
            Some(_) => Navigation::Stay,
        }
    }

    /// Resolve a backward step. No wrap-around.
    pub(crate) fn resolve_previous(&self, queue: &TrackQueue) -> Navigation {
        match queue.current_index() {
            Some(i) if i > 0 => Navigation::MoveTo(i - 1),
            _ => Navigation::Stay,
        }
    }
}

/// Enable shuffle: snapshot the order, shuffle the rest of the queue
/// behind the current track, and select position 0.
///
/// Idempotent if already enabled. The current track is placed at the
/// front without participating in the shuffle of the others.
fn enable_shuffle(queue: &mut TrackQueue) {
    if queue.is_shuffled() {
        return;
    }
    queue.snapshot_order();

    let mut rng = thread_rng();
    let mut items = queue.items().to_vec();

    match queue.current_index() {
        Some(cur) => {
            let current = items.remove(cur);
            items.shuffle(&mut rng);
            items.insert(0, current);
            queue.set_contents(items, Some(0));
        }
        None => {
            items.shuffle(&mut rng);
            queue.set_contents(items, None);
        }
    }
}

/// Disable shuffle: restore the snapshotted order and re-locate the
/// current track by identity (position 0 if it is no longer present).
///
/// No-op if shuffle was never enabled.
fn disable_shuffle(queue: &mut TrackQueue) {
    let Some(original) = queue.take_snapshot() else {
        return;
    };

    let current = match queue.current_track() {
        Some(track) => {
            let key = track.key();
            Some(
                original
                    .iter()
                    .position(|t| t.key() == key)
                    .unwrap_or(0),
            )
        }
        None => None,
    };

    queue.set_contents(original, current);
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::{Track, TrackSource};
    use std::collections::HashSet;

    fn test_track(id: &str) -> Track {
        Track::new(TrackSource::YouTube, id, format!("Track {id}"), "Test Artist")
    }

    fn queue_of(ids: &[&str]) -> TrackQueue {
        let mut queue = TrackQueue::new();
        for id in ids {
            queue.append(test_track(id));
        }
        queue
    }

    fn ids(queue: &TrackQueue) -> Vec<String> {
        queue.items().iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn shuffle_moves_current_to_front_and_keeps_all_tracks() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e"]);
        queue.select(2).unwrap();

        let mut modes = PlaybackModes::default();
        assert!(modes.toggle_shuffle(&mut queue));

        assert_eq!(queue.current_index(), Some(0));
        assert_eq!(queue.current_track().unwrap().id, "c");

        let set: HashSet<String> = ids(&queue).into_iter().collect();
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn unshuffle_restores_exact_order_and_current_identity() {
        let mut queue = queue_of(&["a", "b", "c", "d", "e"]);
        queue.select(3).unwrap();

        let mut modes = PlaybackModes::default();
        modes.toggle_shuffle(&mut queue);
        assert!(!modes.toggle_shuffle(&mut queue));

        assert_eq!(ids(&queue), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(queue.current_index(), Some(3));
        assert_eq!(queue.current_track().unwrap().id, "d");
    }

    #[test]
    fn unshuffle_without_shuffle_is_noop() {
        let mut queue = queue_of(&["a", "b"]);
        disable_shuffle(&mut queue);
        assert_eq!(ids(&queue), vec!["a", "b"]);
    }

    #[test]
    fn shuffle_on_empty_queue() {
        let mut queue = TrackQueue::new();
        let mut modes = PlaybackModes::default();
        assert!(modes.toggle_shuffle(&mut queue));
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), None);
    }

    #[test]
    fn next_advances_within_queue() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.select(0).unwrap();

        let modes = PlaybackModes::default();
        assert_eq!(modes.resolve_next(&queue), Navigation::MoveTo(1));
    }

    #[test]
    fn next_at_end_stays_without_repeat() {
        let mut queue = queue_of(&["a", "b"]);
        queue.select(1).unwrap();

        let modes = PlaybackModes::default();
        assert_eq!(modes.resolve_next(&queue), Navigation::Stay);
        assert!(!modes.has_next(&queue));
    }

    #[test]
    fn next_wraps_with_repeat_all() {
        let mut queue = queue_of(&["a", "b"]);
        queue.select(1).unwrap();

        let modes = PlaybackModes {
            shuffle: false,
            repeat: RepeatMode::All,
        };
        assert_eq!(modes.resolve_next(&queue), Navigation::MoveTo(0));
        assert!(modes.has_next(&queue));
    }

    #[test]
    fn repeat_one_replays_without_moving() {
        let mut queue = queue_of(&["a", "b"]);
        queue.select(0).unwrap();

        let modes = PlaybackModes {
            shuffle: false,
            repeat: RepeatMode::One,
        };
        assert_eq!(modes.resolve_next(&queue), Navigation::Replay);
    }

    #[test]
    fn previous_never_wraps() {
        let mut queue = queue_of(&["a", "b"]);
        queue.select(0).unwrap();

        let modes = PlaybackModes {
            shuffle: false,
            repeat: RepeatMode::All,
        };
        assert_eq!(modes.resolve_previous(&queue), Navigation::Stay);
        assert!(!modes.has_previous(&queue));
    }

    #[test]
    fn previous_retreats_one() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.select(2).unwrap();

        let modes = PlaybackModes::default();
        assert_eq!(modes.resolve_previous(&queue), Navigation::MoveTo(1));
        assert!(modes.has_previous(&queue));
    }
}
