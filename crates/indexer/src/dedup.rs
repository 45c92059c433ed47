//! Identifier deduplication across acquisition phases.

use std::collections::HashSet;

/// Admits each record identifier at most once per aggregation run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    /// Create an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `id` is seen, `false` afterwards.
    pub fn admit(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string())
    }

    /// Number of admitted identifiers.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been admitted yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
