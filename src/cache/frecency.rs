//! Frecency Tracker Module
//!
//! Keeps keys ordered by eviction rank for frecency-based eviction.

use std::collections::BTreeMap;

// == Frecency Tracker ==
/// Tracks eviction order for the frecency strategy.
///
/// Keys are indexed by `(frequency, recency)`:
/// - First = lowest frequency, stalest among equals (next victim)
/// - Last = highest frequency, freshest among equals
///
/// Recency ticks are unique per table, so every rank maps to one key.
#[derive(Debug, Default)]
pub struct FrecencyTracker {
    order: BTreeMap<(u64, u64), String>,
}

impl FrecencyTracker {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: BTreeMap::new(),
        }
    }

    // == Insert ==
    /// Starts tracking a key at the given rank.
    pub fn insert(&mut self, key: &str, rank: (u64, u64)) {
        self.order.insert(rank, key.to_string());
    }

    // == Reposition ==
    /// Moves a tracked key from its old rank to a new one.
    pub fn reposition(&mut self, old_rank: (u64, u64), new_rank: (u64, u64)) {
        if old_rank == new_rank {
            return;
        }
        if let Some(key) = self.order.remove(&old_rank) {
            self.order.insert(new_rank, key);
        }
    }

    // == Remove ==
    /// Stops tracking whatever key sits at the given rank.
    pub fn remove(&mut self, rank: (u64, u64)) -> Option<String> {
        self.order.remove(&rank)
    }

    /// Checks whether some key already sits at the given rank.
    pub fn contains(&self, rank: (u64, u64)) -> bool {
        self.order.contains_key(&rank)
    }

    // == Peek Lowest ==
    /// Returns the lowest-ranked key without removing it.
    pub fn peek_lowest(&self) -> Option<&String> {
        self.order.values().next()
    }

    // == Lowest Excluding ==
    /// Returns up to `n` lowest-ranked keys, skipping `protect`.
    pub fn lowest(&self, n: usize, protect: Option<&str>) -> Vec<String> {
        self.order
            .values()
            .filter(|k| Some(k.as_str()) != protect)
            .take(n)
            .cloned()
            .collect()
    }

    // == Iterate ==
    /// Iterates keys from lowest to highest rank.
    pub fn iter(&self) -> impl Iterator<Item = (&(u64, u64), &String)> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }
}
