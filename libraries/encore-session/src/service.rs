//! Async session service
//!
//! Wraps [`SessionEngine`] for concurrent use. The engine mutex realizes
//! the single-writer rule: every mutation locks, runs to completion,
//! persists its dirty keys in order, and only then broadcasts events.
//! Timer ticks and radio fetch results re-enter through the same mutex.

use crate::engine::SessionEngine;
use crate::error::Result;
use crate::events::SessionEvent;
use crate::persist::{encode_key, restore_engine};
use crate::radio::RadioPlan;
use crate::sleep::SleepTick;
use crate::types::{RepeatMode, SessionConfig, SessionSnapshot};
use encore_core::{MediaProvider, PersistenceAdapter, Track, TrackKey};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

/// Broadcast capacity; slow consumers that lag past this many events
/// observe a `Lagged` error and resynchronize from a snapshot.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Handle to a running playback session.
///
/// Cheap to clone; all clones address the same session. Constructed once
/// per application lifetime and injected into consumers explicitly.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    engine: Mutex<SessionEngine>,
    adapter: Arc<dyn PersistenceAdapter>,
    provider: Arc<dyn MediaProvider>,
    events: broadcast::Sender<SessionEvent>,

    /// The sleep timer's tick task, when armed
    sleep_task: StdMutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Create a new idle session
    pub fn new(
        config: SessionConfig,
        provider: Arc<dyn MediaProvider>,
        adapter: Arc<dyn PersistenceAdapter>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                engine: Mutex::new(SessionEngine::new(config)),
                adapter,
                provider,
                events,
                sleep_task: StdMutex::new(None),
            }),
        }
    }

    /// Reload persisted state from the adapter.
    ///
    /// Every key is read independently; a corrupt value costs only its
    /// own state. Intended to run once at startup, before consumers
    /// subscribe.
    pub async fn restore(&self) {
        let mut engine = self.inner.engine.lock().await;
        restore_engine(&mut engine, self.inner.adapter.as_ref()).await;
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    // === Playback operations ===

    /// Queue a track to play immediately and select it
    pub async fn play_now(&self, track: Track) {
        let mut engine = self.inner.engine.lock().await;
        engine.play_now(track);
        flush(&self.inner, engine, true).await;
    }

    /// Append a track to the queue (starts it if the session was idle)
    pub async fn enqueue(&self, track: Track) {
        let mut engine = self.inner.engine.lock().await;
        engine.enqueue(track);
        flush(&self.inner, engine, true).await;
    }

    /// Remove the queue entry at `index`
    pub async fn remove_from_queue(&self, index: usize) -> Result<()> {
        let mut engine = self.inner.engine.lock().await;
        let outcome = engine.remove_from_queue(index);
        flush(&self.inner, engine, true).await;
        outcome
    }

    /// Move a queue entry from `from` to `to`
    pub async fn reorder(&self, from: usize, to: usize) -> Result<()> {
        let mut engine = self.inner.engine.lock().await;
        let outcome = engine.reorder(from, to);
        flush(&self.inner, engine, true).await;
        outcome
    }

    /// Empty the queue and stop playback
    pub async fn clear_queue(&self) {
        let mut engine = self.inner.engine.lock().await;
        engine.clear_queue();
        flush(&self.inner, engine, true).await;
    }

    /// Step to the next track (wraps under repeat-all, restarts under
    /// repeat-one)
    pub async fn advance(&self) {
        let mut engine = self.inner.engine.lock().await;
        engine.advance();
        flush(&self.inner, engine, true).await;
    }

    /// Step back one track
    pub async fn retreat(&self) {
        let mut engine = self.inner.engine.lock().await;
        engine.retreat();
        flush(&self.inner, engine, true).await;
    }

    /// Toggle shuffle; returns the new state
    pub async fn toggle_shuffle(&self) -> bool {
        let mut engine = self.inner.engine.lock().await;
        let enabled = engine.toggle_shuffle();
        flush(&self.inner, engine, true).await;
        enabled
    }

    /// Cycle the repeat mode; returns the new mode
    pub async fn cycle_repeat(&self) -> RepeatMode {
        let mut engine = self.inner.engine.lock().await;
        let mode = engine.cycle_repeat();
        flush(&self.inner, engine, true).await;
        mode
    }

    /// Toggle radio mode; returns the new state
    pub async fn toggle_radio_mode(&self) -> bool {
        let mut engine = self.inner.engine.lock().await;
        let enabled = engine.toggle_radio_mode();
        flush(&self.inner, engine, true).await;
        enabled
    }

    /// Toggle a track's favorite flag; returns the new state
    pub async fn toggle_favorite(&self, track: &Track) -> bool {
        let mut engine = self.inner.engine.lock().await;
        let favorite = engine.toggle_favorite(track);
        flush(&self.inner, engine, true).await;
        favorite
    }

    /// Record a search query
    pub async fn record_search(&self, query: &str) {
        let mut engine = self.inner.engine.lock().await;
        engine.record_search(query);
        flush(&self.inner, engine, true).await;
    }

    /// Forget all recent searches
    pub async fn clear_recent_searches(&self) {
        let mut engine = self.inner.engine.lock().await;
        engine.clear_recent_searches();
        flush(&self.inner, engine, true).await;
    }

    /// Set the playback rate
    pub async fn set_playback_speed(&self, speed: f32) {
        let mut engine = self.inner.engine.lock().await;
        engine.set_playback_speed(speed);
        flush(&self.inner, engine, true).await;
    }

    /// Arm the sleep timer for `minutes`, or disarm with `None`.
    ///
    /// Arming starts the one-second tick task; disarming (and expiry)
    /// cancels it so no recurring task leaks.
    pub async fn set_sleep_timer(&self, minutes: Option<u32>) {
        let mut engine = self.inner.engine.lock().await;
        engine.set_sleep_timer(minutes);
        let armed = engine.sleep_remaining_secs().is_some();
        flush(&self.inner, engine, true).await;

        self.stop_ticker();
        if armed {
            self.start_ticker();
        }
    }

    // === Queries ===

    /// Observable snapshot of the session
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.engine.lock().await.snapshot()
    }

    /// Play history, most recent first
    pub async fn history(&self) -> Vec<Track> {
        self.inner.engine.lock().await.history().entries().to_vec()
    }

    /// Top `n` tracks from the play history
    pub async fn top_tracks(&self, n: usize) -> Vec<(Track, usize)> {
        self.inner.engine.lock().await.top_tracks(n)
    }

    /// Recent searches, most recent first
    pub async fn recent_searches(&self) -> Vec<String> {
        self.inner
            .engine
            .lock()
            .await
            .recent_searches()
            .entries()
            .to_vec()
    }

    /// Whether the identity is a favorite
    pub async fn is_favorite(&self, key: &TrackKey) -> bool {
        self.inner.engine.lock().await.is_favorite(key)
    }

    /// Cancel background tasks. The session remains usable; an armed
    /// sleep timer stops ticking.
    pub fn shutdown(&self) {
        self.stop_ticker();
    }

    // === Internals ===

    fn start_ticker(&self) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut engine = inner.engine.lock().await;
                let outcome = engine.tick_sleep();
                flush(&inner, engine, false).await;
                match outcome {
                    SleepTick::Running(_) => {}
                    SleepTick::Expired | SleepTick::Disabled => break,
                }
            }
        });

        if let Some(old) = lock_slot(&self.inner.sleep_task).replace(handle) {
            old.abort();
        }
    }

    fn stop_ticker(&self) {
        if let Some(handle) = lock_slot(&self.inner.sleep_task).take() {
            handle.abort();
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(handle) = lock_slot(&self.sleep_task).take() {
            handle.abort();
        }
    }
}

fn lock_slot<'a>(
    slot: &'a StdMutex<Option<JoinHandle<()>>>,
) -> std::sync::MutexGuard<'a, Option<JoinHandle<()>>> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Persist dirty keys (in order, under the engine lock), then broadcast
/// events, then kick off any radio fetch the mutation made due.
///
/// `evaluate_radio` is false for flushes triggered by fetch completions
/// and timer ticks: a fetch that came back empty must wait for the next
/// user-driven evaluation instead of immediately looping.
async fn flush(
    inner: &Arc<SessionInner>,
    mut engine: MutexGuard<'_, SessionEngine>,
    evaluate_radio: bool,
) {
    for key in engine.take_dirty() {
        match encode_key(&engine, key) {
            Ok(value) => {
                if let Err(err) = inner.adapter.set(key.as_str(), value).await {
                    warn!(key = key.as_str(), error = %err, "failed to persist session state");
                }
            }
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "failed to encode session state");
            }
        }
    }

    let events = engine.take_events();
    let plan = if evaluate_radio {
        engine.radio_plan()
    } else {
        None
    };
    drop(engine);

    for event in events {
        // Send only fails when nobody is subscribed
        let _ = inner.events.send(event);
    }

    if let Some(plan) = plan {
        spawn_radio_fetch(inner, plan);
    }
}

/// Run a radio fetch as a detached task that re-enters the single-writer
/// context with its result. Stale results (current track changed since
/// the fetch was seeded) are discarded by the engine.
fn spawn_radio_fetch(inner: &Arc<SessionInner>, plan: RadioPlan) {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        let result = inner.provider.search(&plan.query, plan.limit).await;
        let mut engine = inner.engine.lock().await;
        engine.apply_radio_results(&plan.seed, result);
        flush(&inner, engine, false).await;
    });
}
