//! Property-based tests for the session engine
//!
//! Uses proptest to verify the queue-pointer invariants across many
//! random operation sequences.

use encore_core::{Track, TrackSource};
use encore_session::{SessionEngine, SessionError};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

fn arbitrary_source() -> impl Strategy<Value = TrackSource> {
    prop_oneof![
        Just(TrackSource::YouTube),
        Just(TrackSource::SoundCloud),
    ]
}

fn arbitrary_track() -> impl Strategy<Value = Track> {
    (
        "[a-z0-9]{1,8}",   // id
        "[A-Za-z ]{1,20}", // title
        "[A-Za-z ]{1,16}", // artist
        1u32..600,         // duration (seconds)
        arbitrary_source(),
    )
        .prop_map(|(id, title, artist, duration_secs, source)| Track {
            id,
            title,
            artist,
            duration_secs,
            thumbnail_url: String::new(),
            source,
        })
}

fn arbitrary_tracks() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(arbitrary_track(), 1..30)
}

/// The structural invariants every queue state must satisfy
fn assert_queue_invariants(engine: &SessionEngine) {
    match engine.current_index() {
        Some(i) => {
            assert!(
                i < engine.queue().len(),
                "pointer {} out of range (len {})",
                i,
                engine.queue().len()
            );
            assert_eq!(
                engine.current_track().map(|t| t.key()),
                engine.queue().get(i).map(Track::key),
                "current track must be the item at the pointer"
            );
        }
        None => {
            // Through the engine's public operations, nothing-selected
            // only occurs with an empty queue
            assert!(
                engine.queue().is_empty(),
                "no selection with a non-empty queue"
            );
        }
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: for all sequences of enqueue/remove/reorder, the
    /// pointer is None iff the queue is empty, and in range otherwise
    #[test]
    fn pointer_invariants_under_structural_ops(
        tracks in arbitrary_tracks(),
        operations in prop::collection::vec((0u8..3, 0usize..40, 0usize..40), 1..60)
    ) {
        let mut engine = SessionEngine::default();

        for (op, a, b) in operations {
            match op {
                0 => engine.enqueue(tracks[a % tracks.len()].clone()),
                1 => {
                    let len = engine.queue().len();
                    if len > 0 {
                        engine.remove_from_queue(a % len).unwrap();
                    }
                }
                _ => {
                    let len = engine.queue().len();
                    if len > 0 {
                        engine.reorder(a % len, b % len).unwrap();
                    }
                }
            }
            assert_queue_invariants(&engine);
        }
    }

    /// Property: the invariants survive the full operation surface,
    /// including play-now, navigation, shuffle, and clear
    #[test]
    fn pointer_invariants_under_full_surface(
        tracks in arbitrary_tracks(),
        operations in prop::collection::vec((0u8..8, 0usize..40, 0usize..40), 1..80)
    ) {
        let mut engine = SessionEngine::default();

        for (op, a, b) in operations {
            let len = engine.queue().len();
            match op {
                0 => engine.enqueue(tracks[a % tracks.len()].clone()),
                1 => engine.play_now(tracks[a % tracks.len()].clone()),
                2 if len > 0 => engine.remove_from_queue(a % len).unwrap(),
                3 if len > 0 => engine.reorder(a % len, b % len).unwrap(),
                4 => engine.advance(),
                5 => engine.retreat(),
                6 => { engine.toggle_shuffle(); }
                7 => engine.clear_queue(),
                _ => {}
            }
            assert_queue_invariants(&engine);
        }
    }

    /// Property: out-of-range mutations fail loudly and leave the state
    /// untouched
    #[test]
    fn invalid_indices_never_corrupt_state(
        tracks in arbitrary_tracks(),
        offset in 0usize..10
    ) {
        let mut engine = SessionEngine::default();
        for track in &tracks {
            engine.enqueue(track.clone());
        }

        let len = engine.queue().len();
        let before: Vec<String> = engine.queue().items().iter().map(|t| t.id.clone()).collect();

        prop_assert!(matches!(
            engine.remove_from_queue(len + offset),
            Err(SessionError::InvalidIndex(_))
        ));
        prop_assert!(matches!(
            engine.reorder(0, len + offset),
            Err(SessionError::InvalidIndex(_))
        ));

        let after: Vec<String> = engine.queue().items().iter().map(|t| t.id.clone()).collect();
        prop_assert_eq!(before, after);
        assert_queue_invariants(&engine);
    }

    /// Property: shuffle preserves the track multiset and un-shuffle
    /// restores the exact order with the same current identity
    #[test]
    fn shuffle_unshuffle_round_trip(
        tracks in arbitrary_tracks(),
        select in 0usize..30
    ) {
        let mut engine = SessionEngine::default();
        for track in &tracks {
            engine.enqueue(track.clone());
        }
        for _ in 0..(select % tracks.len()) {
            engine.advance();
        }

        let order_before: Vec<String> =
            engine.queue().items().iter().map(|t| t.id.clone()).collect();
        let current_before = engine.current_track().map(Track::key);

        engine.toggle_shuffle();

        // Same multiset while shuffled, current track at the front
        prop_assert_eq!(engine.queue().len(), order_before.len());
        prop_assert_eq!(engine.current_track().map(Track::key), current_before.clone());
        prop_assert_eq!(engine.current_index(), Some(0));

        engine.toggle_shuffle();

        let order_after: Vec<String> =
            engine.queue().items().iter().map(|t| t.id.clone()).collect();
        prop_assert_eq!(order_after, order_before);
        prop_assert_eq!(engine.current_track().map(Track::key), current_before);
    }

    /// Property: history stays bounded and never holds the same identity
    /// twice
    #[test]
    fn history_bounded_and_unique(
        tracks in prop::collection::vec(arbitrary_track(), 1..120)
    ) {
        let mut engine = SessionEngine::default();
        for track in tracks {
            engine.play_now(track);
        }

        let history = engine.history();
        prop_assert!(history.len() <= 50);

        let mut seen = HashSet::new();
        for track in history.entries() {
            prop_assert!(seen.insert(track.key()), "duplicate identity in history");
        }
    }
}
