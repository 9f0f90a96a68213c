//! Seen-set of decoded question texts
//!
//! Scoped to one category by default, or to the whole run (see
//! [`DedupScope`](crate::config::DedupScope)). The importer measures progress by
//! its size, so repeats across pages never inflate the imported count.

use std::collections::HashSet;

/// Tracks which question texts were already persisted in the current scope
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    /// Empty seen-set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `text` was already recorded
    pub fn seen(&self, text: &str) -> bool {
        self.seen.contains(text)
    }

    /// Record `text`; returns `false` if it was already present
    pub fn record(&mut self, text: impl Into<String>) -> bool {
        self.seen.insert(text.into())
    }

    /// Number of distinct texts recorded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing was recorded yet
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forget everything (start of a new category scope)
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
