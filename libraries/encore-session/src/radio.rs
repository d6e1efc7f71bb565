//! Radio mode: automatic queue replenishment
//!
//! When radio mode is on and the queue runs low on unplayed tracks, the
//! session fetches tracks related to the current one and appends them.
//! The check is level-triggered — safe to evaluate after every mutation —
//! and single-flight per current-track identity, so repeated evaluations
//! never stack up duplicate fetches.

use crate::queue::TrackQueue;
use encore_core::{Track, TrackKey};

/// A fetch the session service should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RadioPlan {
    /// Identity of the track that seeded the fetch; results are discarded
    /// if the current track has changed by the time they arrive
    pub(crate) seed: TrackKey,

    /// Search query derived from the seeding track
    pub(crate) query: String,

    /// How many results to request
    pub(crate) limit: usize,
}

/// Replenishment bookkeeping
#[derive(Debug, Clone, Default)]
pub(crate) struct RadioAugmenter {
    /// Whether radio mode is on
    enabled: bool,

    /// Identity a fetch is currently in flight for
    in_flight: Option<TrackKey>,

    /// Refill when fewer unplayed tracks than this remain
    low_water: usize,

    /// Results to request per fetch
    fetch_limit: usize,

    /// Tracks appended per fetch at most
    append_max: usize,
}

impl RadioAugmenter {
    pub(crate) fn new(low_water: usize, fetch_limit: usize, append_max: usize) -> Self {
        Self {
            enabled: false,
            in_flight: None,
            low_water,
            fetch_limit,
            append_max,
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flip radio mode; returns the new state
    pub(crate) fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Evaluate the refill condition.
    ///
    /// Returns a plan (and marks it in flight) when radio mode is on, a
    /// current track exists, the queue is low, and no fetch is already in
    /// flight for this track's identity.
    pub(crate) fn plan(&mut self, queue: &TrackQueue) -> Option<RadioPlan> {
        if !self.enabled {
            return None;
        }
        let current = queue.current_track()?;
        if queue.upcoming_len() >= self.low_water {
            return None;
        }

        let seed = current.key();
        if self.in_flight.as_ref() == Some(&seed) {
            return None;
        }
        self.in_flight = Some(seed.clone());

        Some(RadioPlan {
            seed,
            query: format!("{} {}", current.artist, current.title),
            limit: self.fetch_limit,
        })
    }

    /// Mark the fetch for `seed` finished (successfully or not), allowing
    /// the next evaluation to fetch again.
    pub(crate) fn settle(&mut self, seed: &TrackKey) {
        if self.in_flight.as_ref() == Some(seed) {
            self.in_flight = None;
        }
    }

    /// Pick which fetched tracks to append: drop anything already in the
    /// queue or identical to the current track, cap at `append_max`.
    pub(crate) fn select(&self, results: Vec<Track>, queue: &TrackQueue) -> Vec<Track> {
        let current_key = queue.current_track().map(Track::key);

        results
            .into_iter()
            .filter(|t| Some(t.key()) != current_key && !queue.contains(t))
            .take(self.append_max)
            .collect()
    }
}
