//! Play queue with a current-position pointer
//!
//! Pure state and transition logic, no I/O. The pointer invariants:
//! `current == None` iff the queue is empty or nothing has been selected;
//! otherwise `current` is a valid index into `items`.

use crate::error::{Result, SessionError};
use encore_core::Track;

/// Ordered play queue.
///
/// Duplicates by id are permitted — the same track may be queued twice.
/// While shuffle is enabled, `original_order` holds the pre-shuffle
/// sequence so disabling shuffle restores it exactly; structural
/// mutations keep that snapshot consistent.
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    /// Tracks in play order
    items: Vec<Track>,

    /// Index of the current track, `None` when nothing is selected
    current: Option<usize>,

    /// Pre-shuffle order, present only while shuffle is enabled
    original_order: Option<Vec<Track>>,
}

impl TrackQueue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a track to play immediately.
    ///
    /// On an empty queue the track becomes the sole entry and is
    /// selected. Otherwise it is inserted right after the current track
    /// and the pointer advances onto it, so the rest of the queue is
    /// preserved as "up next".
    pub fn set_and_play(&mut self, track: Track) -> usize {
        if let Some(order) = self.original_order.as_mut() {
            order.push(track.clone());
        }

        let at = match self.current {
            Some(i) if !self.items.is_empty() => i + 1,
            _ => 0,
        };
        self.items.insert(at, track);
        self.current = Some(at);
        at
    }

    /// Push a track to the end of the queue.
    ///
    /// If nothing was selected, the appended track becomes current.
    pub fn append(&mut self, track: Track) -> usize {
        if let Some(order) = self.original_order.as_mut() {
            order.push(track.clone());
        }

        self.items.push(track);
        let at = self.items.len() - 1;
        if self.current.is_none() {
            self.current = Some(at);
        }
        at
    }

    /// Remove the element at `index` and return it.
    ///
    /// Pointer resolution when the removed element is the current one:
    /// prefer the item that shifts into the vacated slot; failing that,
    /// the previous item; failing that, the queue is empty and nothing is
    /// selected.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.items.len() {
            return Err(SessionError::InvalidIndex(index));
        }

        let removed = self.items.remove(index);

        if let Some(order) = self.original_order.as_mut() {
            if let Some(pos) = order.iter().position(|t| t.same_item(&removed)) {
                order.remove(pos);
            }
        }

        self.current = match self.current {
            Some(cur) if index < cur => Some(cur - 1),
            Some(cur) if index == cur => {
                if index < self.items.len() {
                    // The old next item shifted into this slot
                    Some(index)
                } else if index > 0 {
                    Some(index - 1)
                } else {
                    None
                }
            }
            other => other,
        };

        Ok(removed)
    }

    /// Empty the queue and clear the selection
    pub fn clear(&mut self) {
        self.items.clear();
        self.current = None;
        self.original_order = None;
    }

    /// Relocate one element, preserving all other relative order.
    ///
    /// The pointer is re-derived so it keeps addressing the same logical
    /// track after the move.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        if from >= len {
            return Err(SessionError::InvalidIndex(from));
        }
        if to >= len {
            return Err(SessionError::InvalidIndex(to));
        }
        if from == to {
            return Ok(());
        }

        let track = self.items.remove(from);
        self.items.insert(to, track);

        if let Some(cur) = self.current {
            self.current = Some(if from == cur {
                to
            } else if from < cur && to >= cur {
                cur - 1
            } else if from > cur && to <= cur {
                cur + 1
            } else {
                cur
            });
        }

        Ok(())
    }

    /// Move the pointer to `index`
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(SessionError::InvalidIndex(index));
        }
        self.current = Some(index);
        Ok(())
    }

    /// Queue contents in play order
    pub fn items(&self) -> &[Track] {
        &self.items
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current position, if anything is selected
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The track at the current position
    pub fn current_track(&self) -> Option<&Track> {
        self.current.map(|i| &self.items[i])
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.items.get(index)
    }

    /// Unplayed tracks remaining after the current one
    pub fn upcoming_len(&self) -> usize {
        match self.current {
            Some(i) => self.items.len() - i - 1,
            None => self.items.len(),
        }
    }

    /// Whether `track` (by identity) is anywhere in the queue
    pub fn contains(&self, track: &Track) -> bool {
        self.items.iter().any(|t| t.same_item(track))
    }

    /// Whether shuffle order is in effect (a restore snapshot exists)
    pub fn is_shuffled(&self) -> bool {
        self.original_order.is_some()
    }

    /// Snapshot the current order for later restoration.
    ///
    /// No-op if a snapshot already exists (shuffle already enabled).
    pub(crate) fn snapshot_order(&mut self) {
        if self.original_order.is_none() {
            self.original_order = Some(self.items.clone());
        }
    }

    /// Take the restore snapshot, leaving shuffle off
    pub(crate) fn take_snapshot(&mut self) -> Option<Vec<Track>> {
        self.original_order.take()
    }

    /// Move the pointer to an index already validated by the caller
    /// (navigation resolution works on this same queue state).
    pub(crate) fn set_current(&mut self, index: usize) {
        debug_assert!(index < self.items.len());
        self.current = Some(index);
    }

    /// Replace contents and pointer wholesale.
    ///
    /// Used by shuffle commit/restore and by session restore; `current`
    /// must be in range (debug-asserted, callers derive it from `items`).
    pub(crate) fn set_contents(&mut self, items: Vec<Track>, current: Option<usize>) {
        debug_assert!(current.map_or(true, |i| i < items.len()));
        self.items = items;
        self.current = current;
    }
}
