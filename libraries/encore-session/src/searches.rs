//! Recent search queries
//!
//! Most recent first, capped, deduplicated case-insensitively. Repeating
//! a query moves it to the front and the most recent casing wins.

/// Bounded recent-search list
#[derive(Debug, Clone)]
pub struct RecentSearches {
    /// Queries, most recent first
    entries: Vec<String>,

    /// Maximum number of entries
    max_size: usize,
}

impl RecentSearches {
    /// Create a new list with the given cap
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_size,
        }
    }

    /// Record a query. Whitespace-only queries are ignored.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let lowered = query.to_lowercase();
        self.entries.retain(|q| q.to_lowercase() != lowered);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(self.max_size);
    }

    /// Queries, most recent first
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace contents from persisted state, re-applying the invariants.
    ///
    /// Stored entries are most recent first; replaying them oldest-first
    /// through `record` rebuilds the same order with dedup and cap
    /// enforced.
    pub(crate) fn restore(&mut self, entries: Vec<String>) {
        self.entries.clear();
        for query in entries.iter().rev() {
            self.record(query);
        }
    }
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(10)
    }
}
