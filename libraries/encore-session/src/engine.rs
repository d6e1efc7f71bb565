//! Session engine - core orchestration
//!
//! Composes the queue, playback modes, sleep timer, history, searches,
//! favorites, and radio replenishment behind a single façade. This is
//! the only type other subsystems talk to.
//!
//! The engine is the single writer: every mutation takes `&mut self` and
//! runs to completion, which keeps the queue and its pointer consistent
//! without locks. It performs no I/O — mutations queue [`SessionEvent`]s
//! for broadcast and mark persistence keys dirty for the service layer
//! to write out.

use crate::error::Result;
use crate::events::SessionEvent;
use crate::history::HistoryLog;
use crate::modes::{Navigation, PlaybackModes};
use crate::persist::StateKey;
use crate::queue::TrackQueue;
use crate::radio::{RadioAugmenter, RadioPlan};
use crate::searches::RecentSearches;
use crate::sleep::{SleepTick, SleepTimer};
use crate::types::{PlaybackState, RepeatMode, SessionConfig, SessionSnapshot};
use encore_core::{ProviderError, Track, TrackKey};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// The playback session façade.
///
/// Constructed once per application lifetime and injected into consumers
/// explicitly — session state lives here and nowhere else.
pub struct SessionEngine {
    config: SessionConfig,

    // State
    queue: TrackQueue,
    modes: PlaybackModes,
    sleep: SleepTimer,
    history: HistoryLog,
    searches: RecentSearches,
    favorites: HashSet<TrackKey>,
    radio: RadioAugmenter,
    playback_speed: f32,

    // Outbox for the service layer
    pending_events: Vec<SessionEvent>,
    dirty: BTreeSet<StateKey>,
}

impl SessionEngine {
    /// Create a new idle session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            queue: TrackQueue::new(),
            modes: PlaybackModes::default(),
            sleep: SleepTimer::new(),
            history: HistoryLog::new(config.history_size),
            searches: RecentSearches::new(config.recent_search_size),
            favorites: HashSet::new(),
            radio: RadioAugmenter::new(
                config.radio_low_water,
                config.radio_fetch_limit,
                config.radio_append_max,
            ),
            playback_speed: 1.0,
            pending_events: Vec::new(),
            dirty: BTreeSet::new(),
            config,
        }
    }

    // === Queue operations ===

    /// Queue `track` to play immediately and select it
    pub fn play_now(&mut self, track: Track) {
        self.queue.set_and_play(track.clone());
        self.mark_queue_dirty();
        self.push_queue_changed();
        self.started(track);
    }

    /// Append `track` to the end of the queue.
    ///
    /// If nothing was playing, the appended track starts.
    pub fn enqueue(&mut self, track: Track) {
        let was_idle = self.queue.current_index().is_none();
        self.queue.append(track);
        self.mark_dirty(StateKey::Queue);
        self.push_queue_changed();

        if was_idle {
            self.mark_dirty(StateKey::CurrentIndex);
            self.mark_dirty(StateKey::CurrentTrack);
            if let Some(track) = self.queue.current_track().cloned() {
                self.started(track);
            }
        }
    }

    /// Remove the queue entry at `index`.
    ///
    /// If this removed the current track, the track that took its place
    /// (if any) is treated as now playing; an emptied queue stops
    /// playback.
    pub fn remove_from_queue(&mut self, index: usize) -> Result<()> {
        let was_current = self.queue.current_index() == Some(index);
        self.queue.remove(index)?;
        self.mark_queue_dirty();
        self.push_queue_changed();

        if was_current {
            match self.queue.current_track().cloned() {
                Some(track) => self.started(track),
                None => self.pending_events.push(SessionEvent::PlaybackStopped),
            }
        }
        Ok(())
    }

    /// Move a queue entry from `from` to `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.move_item(from, to)?;
        self.mark_queue_dirty();
        self.push_queue_changed();
        Ok(())
    }

    /// Empty the queue and stop playback
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.mark_queue_dirty();
        self.push_queue_changed();
        self.pending_events.push(SessionEvent::PlaybackStopped);
    }

    // === Navigation ===

    /// Step forward: next track, wrap under repeat-all, or restart the
    /// current track under repeat-one
    pub fn advance(&mut self) {
        match self.modes.resolve_next(&self.queue) {
            Navigation::Replay => {
                if let Some(track) = self.queue.current_track().cloned() {
                    self.started(track);
                }
            }
            Navigation::MoveTo(index) => self.move_current(index),
            Navigation::Stay => {}
        }
    }

    /// Step backward one track. Never wraps.
    pub fn retreat(&mut self) {
        match self.modes.resolve_previous(&self.queue) {
            Navigation::MoveTo(index) => self.move_current(index),
            Navigation::Replay | Navigation::Stay => {}
        }
    }

    fn move_current(&mut self, index: usize) {
        self.queue.set_current(index);
        self.mark_dirty(StateKey::CurrentIndex);
        self.mark_dirty(StateKey::CurrentTrack);
        if let Some(track) = self.queue.current_track().cloned() {
            self.started(track);
        }
    }

    /// Whether a next track is reachable
    pub fn has_next(&self) -> bool {
        self.modes.has_next(&self.queue)
    }

    /// Whether a previous track is reachable
    pub fn has_previous(&self) -> bool {
        self.modes.has_previous(&self.queue)
    }

    // === Modes ===

    /// Toggle shuffle; returns the new state
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.modes.toggle_shuffle(&mut self.queue);
        self.mark_queue_dirty();
        self.pending_events
            .push(SessionEvent::ShuffleChanged { enabled });
        self.push_queue_changed();
        enabled
    }

    /// Cycle the repeat mode; returns the new mode
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        let mode = self.modes.cycle_repeat();
        self.pending_events.push(SessionEvent::RepeatChanged { mode });
        mode
    }

    // === Sleep timer ===

    /// Arm the sleep timer for `minutes`, or disarm with `None`
    pub fn set_sleep_timer(&mut self, minutes: Option<u32>) {
        match minutes {
            Some(m) => self.sleep.set_minutes(m),
            None => self.sleep.cancel(),
        }
        self.pending_events.push(SessionEvent::SleepTimerSet {
            remaining_secs: self.sleep.remaining_secs(),
        });
    }

    /// Advance the sleep countdown by one second.
    ///
    /// Called by the service's tick task. Expiry stops playback (the
    /// queue and pointer are untouched) and disarms the timer.
    pub(crate) fn tick_sleep(&mut self) -> SleepTick {
        let tick = self.sleep.tick();
        match tick {
            SleepTick::Running(remaining_secs) => {
                self.pending_events
                    .push(SessionEvent::SleepTimerTick { remaining_secs });
            }
            SleepTick::Expired => {
                self.pending_events.push(SessionEvent::SleepTimerExpired);
                self.pending_events.push(SessionEvent::PlaybackStopped);
            }
            SleepTick::Disabled => {}
        }
        tick
    }

    // === Radio ===

    /// Toggle radio mode; returns the new state
    pub fn toggle_radio_mode(&mut self) -> bool {
        let enabled = self.radio.toggle();
        self.pending_events
            .push(SessionEvent::RadioModeChanged { enabled });
        enabled
    }

    /// Evaluate the replenishment condition; marks the returned plan as
    /// in flight
    pub(crate) fn radio_plan(&mut self) -> Option<RadioPlan> {
        self.radio.plan(&self.queue)
    }

    /// Apply the outcome of a radio fetch.
    ///
    /// Failures are logged and swallowed — the next evaluation retries.
    /// Results seeded by a track that is no longer current are discarded.
    pub(crate) fn apply_radio_results(
        &mut self,
        seed: &TrackKey,
        result: std::result::Result<Vec<Track>, ProviderError>,
    ) {
        self.radio.settle(seed);

        let results = match result {
            Ok(results) => results,
            Err(err) => {
                warn!(seed = %seed, error = %err, "radio search failed, will retry");
                return;
            }
        };

        if self.queue.current_track().map(Track::key).as_ref() != Some(seed) {
            debug!(seed = %seed, "discarding stale radio results");
            return;
        }

        let picked = self.radio.select(results, &self.queue);
        if picked.is_empty() {
            return;
        }

        let count = picked.len();
        for track in picked {
            self.queue.append(track);
        }
        self.mark_dirty(StateKey::Queue);
        self.pending_events
            .push(SessionEvent::RadioTracksAdded { count });
        self.push_queue_changed();
    }

    // === Favorites, searches, speed ===

    /// Toggle a track's favorite flag; returns the new state
    pub fn toggle_favorite(&mut self, track: &Track) -> bool {
        let key = track.key();
        let favorite = if self.favorites.remove(&key) {
            false
        } else {
            self.favorites.insert(key.clone());
            true
        };
        self.mark_dirty(StateKey::Favorites);
        self.pending_events
            .push(SessionEvent::FavoriteChanged { key, favorite });
        favorite
    }

    /// Whether the identity is currently a favorite
    pub fn is_favorite(&self, key: &TrackKey) -> bool {
        self.favorites.contains(key)
    }

    /// Record a search query
    pub fn record_search(&mut self, query: &str) {
        self.searches.record(query);
        self.mark_dirty(StateKey::RecentSearches);
    }

    /// Forget all recent searches
    pub fn clear_recent_searches(&mut self) {
        self.searches.clear();
        self.mark_dirty(StateKey::RecentSearches);
    }

    /// Set the playback rate. Non-positive or non-finite rates are
    /// ignored.
    pub fn set_playback_speed(&mut self, speed: f32) {
        if !speed.is_finite() || speed <= 0.0 {
            return;
        }
        self.playback_speed = speed;
        self.mark_dirty(StateKey::PlaybackSpeed);
        self.pending_events
            .push(SessionEvent::PlaybackSpeedChanged { speed });
    }

    // === Accessors ===

    /// The play queue
    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    /// Current position in the queue
    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// The now-playing track
    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current_track()
    }

    /// Idle/Active
    pub fn playback_state(&self) -> PlaybackState {
        if self.queue.current_index().is_some() {
            PlaybackState::Active
        } else {
            PlaybackState::Idle
        }
    }

    /// Whether shuffle is on
    pub fn shuffle(&self) -> bool {
        self.modes.shuffle
    }

    /// Current repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.modes.repeat
    }

    /// Whether radio mode is on
    pub fn radio_mode(&self) -> bool {
        self.radio.enabled()
    }

    /// Seconds left on the sleep timer, if armed
    pub fn sleep_remaining_secs(&self) -> Option<u32> {
        self.sleep.remaining_secs()
    }

    /// Playback rate multiplier
    pub fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    /// Play history, most recent first
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Recent searches, most recent first
    pub fn recent_searches(&self) -> &RecentSearches {
        &self.searches
    }

    /// Favorite track identities
    pub fn favorites(&self) -> &HashSet<TrackKey> {
        &self.favorites
    }

    /// Top `n` tracks from the play history
    pub fn top_tracks(&self, n: usize) -> Vec<(Track, usize)> {
        self.history.top_by_play_count(n)
    }

    /// Engine configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Observable snapshot for consumers to render
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            queue: self.queue.items().to_vec(),
            current_index: self.queue.current_index(),
            current_track: self.queue.current_track().cloned(),
            state: self.playback_state(),
            shuffle: self.modes.shuffle,
            repeat: self.modes.repeat,
            radio_mode: self.radio.enabled(),
            sleep_remaining_secs: self.sleep.remaining_secs(),
            playback_speed: self.playback_speed,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }

    // === Service-layer plumbing ===

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Drain the set of persistence keys affected since the last drain
    pub fn take_dirty(&mut self) -> Vec<StateKey> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    // === Restore (no events, no history side effects) ===

    pub(crate) fn restore_queue(&mut self, items: Vec<Track>, current: Option<usize>) {
        let current = current.filter(|&i| i < items.len());
        self.queue.set_contents(items, current);
    }

    /// Re-select by identity when the persisted index was unusable
    pub(crate) fn restore_current_by_key(&mut self, key: &TrackKey) {
        if self.queue.current_index().is_some() {
            return;
        }
        if let Some(index) = self
            .queue
            .items()
            .iter()
            .position(|t| t.key() == *key)
        {
            self.queue.set_current(index);
        }
    }

    pub(crate) fn restore_favorites(&mut self, favorites: HashSet<TrackKey>) {
        self.favorites = favorites;
    }

    pub(crate) fn restore_history(&mut self, entries: Vec<Track>) {
        self.history.restore(entries);
    }

    pub(crate) fn restore_searches(&mut self, entries: Vec<String>) {
        self.searches.restore(entries);
    }

    pub(crate) fn restore_playback_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed > 0.0 {
            self.playback_speed = speed;
        }
    }

    // === Internals ===

    /// A track became the now-playing item: record history, notify
    fn started(&mut self, track: Track) {
        self.history.record(track.clone());
        self.mark_dirty(StateKey::PlayHistory);
        self.pending_events.push(SessionEvent::TrackStarted {
            now_playing: track.now_playing(),
            track,
        });
    }

    fn push_queue_changed(&mut self) {
        self.pending_events.push(SessionEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn mark_dirty(&mut self, key: StateKey) {
        self.dirty.insert(key);
    }

    fn mark_queue_dirty(&mut self) {
        self.mark_dirty(StateKey::Queue);
        self.mark_dirty(StateKey::CurrentIndex);
        self.mark_dirty(StateKey::CurrentTrack);
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::TrackSource;

    fn test_track(id: &str) -> Track {
        Track::new(TrackSource::YouTube, id, format!("Track {id}"), "Test Artist")
    }

    fn events_of(engine: &mut SessionEngine) -> Vec<SessionEvent> {
        engine.take_events()
    }

    fn track_started_ids(events: &[SessionEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::TrackStarted { track, .. } => Some(track.id.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn play_now_starts_and_records_history() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));

        assert_eq!(engine.playback_state(), PlaybackState::Active);
        assert_eq!(engine.current_track().unwrap().id, "a");
        assert_eq!(engine.history().entries()[0].id, "a");

        let events = events_of(&mut engine);
        assert_eq!(track_started_ids(&events), vec!["a"]);
    }

    #[test]
    fn enqueue_on_idle_session_starts_playing() {
        let mut engine = SessionEngine::default();
        engine.enqueue(test_track("a"));
        engine.enqueue(test_track("b"));

        assert_eq!(engine.current_track().unwrap().id, "a");
        // Only the first enqueue entered Active
        let events = events_of(&mut engine);
        assert_eq!(track_started_ids(&events), vec!["a"]);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn removing_current_promotes_shifted_in_track() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));
        engine.enqueue(test_track("b"));
        engine.take_events();

        engine.remove_from_queue(0).unwrap();

        assert_eq!(engine.current_track().unwrap().id, "b");
        let events = events_of(&mut engine);
        assert_eq!(track_started_ids(&events), vec!["b"]);
        // The promoted track is in history too
        assert_eq!(engine.history().entries()[0].id, "b");
    }

    #[test]
    fn removing_only_track_goes_idle() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));
        engine.take_events();

        engine.remove_from_queue(0).unwrap();

        assert_eq!(engine.playback_state(), PlaybackState::Idle);
        assert_eq!(engine.current_index(), None);
        assert!(events_of(&mut engine)
            .iter()
            .any(|e| matches!(e, SessionEvent::PlaybackStopped)));
    }

    #[test]
    fn removing_other_track_does_not_restart_current() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));
        engine.enqueue(test_track("b"));
        engine.take_events();

        engine.remove_from_queue(1).unwrap();

        assert_eq!(engine.current_track().unwrap().id, "a");
        assert!(track_started_ids(&events_of(&mut engine)).is_empty());
    }

    #[test]
    fn clear_queue_stops_playback() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));
        engine.take_events();

        engine.clear_queue();

        assert_eq!(engine.playback_state(), PlaybackState::Idle);
        assert!(engine.queue().is_empty());
        let events = events_of(&mut engine);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::PlaybackStopped)));
    }

    #[test]
    fn advance_wraps_under_repeat_all() {
        let mut engine = SessionEngine::default();
        for id in ["a", "b", "c"] {
            engine.enqueue(test_track(id));
        }
        engine.advance(); // -> b
        engine.cycle_repeat(); // all
        assert_eq!(engine.repeat(), RepeatMode::All);
        engine.take_events();

        engine.advance();
        assert_eq!(engine.current_track().unwrap().id, "c");

        engine.advance();
        assert_eq!(engine.current_track().unwrap().id, "a");
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn advance_at_end_without_repeat_stays() {
        let mut engine = SessionEngine::default();
        engine.enqueue(test_track("a"));
        engine.take_events();

        engine.advance();

        assert_eq!(engine.current_track().unwrap().id, "a");
        assert!(track_started_ids(&events_of(&mut engine)).is_empty());
    }

    #[test]
    fn repeat_one_restarts_same_track() {
        let mut engine = SessionEngine::default();
        engine.enqueue(test_track("a"));
        engine.enqueue(test_track("b"));
        engine.cycle_repeat(); // all
        engine.cycle_repeat(); // one
        engine.take_events();

        engine.advance();

        // Pointer unmoved, but the track restarted
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(track_started_ids(&events_of(&mut engine)), vec!["a"]);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn retreat_never_wraps() {
        let mut engine = SessionEngine::default();
        engine.enqueue(test_track("a"));
        engine.enqueue(test_track("b"));
        engine.cycle_repeat(); // all
        engine.take_events();

        engine.retreat();

        assert_eq!(engine.current_index(), Some(0));
        assert!(track_started_ids(&events_of(&mut engine)).is_empty());
    }

    #[test]
    fn shuffle_round_trip_preserves_order_and_current() {
        let mut engine = SessionEngine::default();
        for id in ["a", "b", "c", "d", "e"] {
            engine.enqueue(test_track(id));
        }
        engine.advance();
        engine.advance(); // current = c

        assert!(engine.toggle_shuffle());
        assert_eq!(engine.current_track().unwrap().id, "c");
        assert_eq!(engine.current_index(), Some(0));

        assert!(!engine.toggle_shuffle());
        let ids: Vec<&str> = engine.queue().items().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(engine.current_index(), Some(2));
    }

    #[test]
    fn sleep_expiry_stops_but_keeps_queue() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));
        engine.set_sleep_timer(Some(1));
        engine.take_events();

        let mut expired = 0;
        for _ in 0..60 {
            if engine.tick_sleep() == SleepTick::Expired {
                expired += 1;
            }
        }

        assert_eq!(expired, 1);
        assert_eq!(engine.sleep_remaining_secs(), None);
        // Queue and pointer untouched
        assert_eq!(engine.current_track().unwrap().id, "a");
        let events = events_of(&mut engine);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, SessionEvent::PlaybackStopped))
                .count(),
            1
        );
    }

    #[test]
    fn radio_results_append_filtered_and_capped() {
        let mut engine = SessionEngine::default();
        engine.toggle_radio_mode();
        engine.play_now(test_track("a"));

        let plan = engine.radio_plan().expect("queue is low, plan expected");
        engine.apply_radio_results(
            &plan.seed,
            Ok(vec![
                test_track("b"),
                test_track("c"),
                test_track("d"),
                test_track("a"),
            ]),
        );

        let ids: Vec<&str> = engine.queue().items().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn stale_radio_results_are_discarded() {
        let mut engine = SessionEngine::default();
        engine.toggle_radio_mode();
        engine.play_now(test_track("a"));

        let plan = engine.radio_plan().unwrap();
        // Current track changes while the fetch is in flight
        engine.play_now(test_track("x"));

        engine.apply_radio_results(&plan.seed, Ok(vec![test_track("b")]));

        let ids: Vec<&str> = engine.queue().items().iter().map(|t| t.id.as_str()).collect();
        assert!(!ids.contains(&"b"));
    }

    #[test]
    fn failed_radio_fetch_is_swallowed_and_retried() {
        let mut engine = SessionEngine::default();
        engine.toggle_radio_mode();
        engine.play_now(test_track("a"));

        let plan = engine.radio_plan().unwrap();
        engine.apply_radio_results(
            &plan.seed,
            Err(ProviderError::Unavailable("boom".to_string())),
        );

        // Queue unchanged, and the next evaluation fetches again
        assert_eq!(engine.queue().len(), 1);
        assert!(engine.radio_plan().is_some());
    }

    #[test]
    fn favorite_toggles_by_identity() {
        let mut engine = SessionEngine::default();
        let track = test_track("a");

        assert!(engine.toggle_favorite(&track));
        assert!(engine.is_favorite(&track.key()));
        assert!(!engine.toggle_favorite(&track));
        assert!(!engine.is_favorite(&track.key()));
    }

    #[test]
    fn mutations_mark_expected_keys_dirty() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));

        let dirty = engine.take_dirty();
        assert!(dirty.contains(&StateKey::Queue));
        assert!(dirty.contains(&StateKey::CurrentIndex));
        assert!(dirty.contains(&StateKey::CurrentTrack));
        assert!(dirty.contains(&StateKey::PlayHistory));

        engine.record_search("jazz");
        assert_eq!(engine.take_dirty(), vec![StateKey::RecentSearches]);

        engine.set_playback_speed(1.5);
        assert_eq!(engine.take_dirty(), vec![StateKey::PlaybackSpeed]);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut engine = SessionEngine::default();
        engine.play_now(test_track("a"));
        engine.enqueue(test_track("b"));
        engine.cycle_repeat();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.queue.len(), 2);
        assert_eq!(snapshot.current_index, Some(0));
        assert_eq!(snapshot.current_track.as_ref().unwrap().id, "a");
        assert_eq!(snapshot.state, PlaybackState::Active);
        assert_eq!(snapshot.repeat, RepeatMode::All);
        assert!(snapshot.has_next);
        assert!(!snapshot.has_previous);
    }
}
