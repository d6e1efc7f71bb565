//! Play history
//!
//! Bounded, deduplicated record of recently played tracks, most recent
//! first. A replay moves the existing entry to the front rather than
//! duplicating it, so no identity ever appears twice.

use encore_core::{Track, TrackKey};

/// Bounded play-history log
#[derive(Debug, Clone)]
pub struct HistoryLog {
    /// Entries, most recent first
    entries: Vec<Track>,

    /// Maximum history size
    max_size: usize,
}

impl HistoryLog {
    /// Create a new history with the given maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
        }
    }

    /// Record a play.
    ///
    /// Any existing entry with the same identity is removed first, then
    /// the track is prepended and the log truncated to its cap.
    pub fn record(&mut self, track: Track) {
        self.entries.retain(|t| !t.same_item(&track));
        self.entries.insert(0, track);
        self.entries.truncate(self.max_size);
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[Track] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Top `n` tracks by play count, ties broken by most recent play.
    ///
    /// Derived on demand, never stored. Counts occurrences per identity
    /// across the log; with the dedup invariant each identity counts
    /// once, making this a recency ranking unless the retention policy
    /// changes.
    pub fn top_by_play_count(&self, n: usize) -> Vec<(Track, usize)> {
        let mut grouped: Vec<(TrackKey, Track, usize)> = Vec::new();

        for track in &self.entries {
            let key = track.key();
            match grouped.iter_mut().find(|(k, _, _)| *k == key) {
                Some((_, _, count)) => *count += 1,
                // First occurrence is the most recent play of this identity
                None => grouped.push((key, track.clone(), 1)),
            }
        }

        // Stable sort keeps recency order within equal counts
        grouped.sort_by(|a, b| b.2.cmp(&a.2));
        grouped
            .into_iter()
            .take(n)
            .map(|(_, track, count)| (track, count))
            .collect()
    }

    /// Replace contents from persisted state, re-applying the cap and
    /// dedup invariants in case the stored blob predates them.
    pub(crate) fn restore(&mut self, entries: Vec<Track>) {
        self.entries.clear();
        for track in entries {
            if !self.entries.iter().any(|t| t.same_item(&track)) {
                self.entries.push(track);
            }
        }
        self.entries.truncate(self.max_size);
    }
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(50)
    }
}
