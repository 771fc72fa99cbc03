//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! snapshot write failures.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of retrievals for absent keys
    pub misses: u64,
    /// Number of entries evicted to stay within capacity
    pub capacity_evictions: u64,
    /// Number of entries evicted to stay within the size budget
    pub size_evictions: u64,
    /// Number of snapshots written successfully
    pub snapshot_writes: u64,
    /// Number of snapshot writes that failed
    pub write_failures: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total entries evicted for any reason.
    pub fn evictions(&self) -> u64 {
        self.capacity_evictions + self.size_evictions
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_capacity_evictions(&mut self, count: usize) {
        self.capacity_evictions += count as u64;
    }

    pub fn record_size_evictions(&mut self, count: usize) {
        self.size_evictions += count as u64;
    }

    // == Record Write ==
    /// Records the outcome of one snapshot write.
    pub fn record_write(&mut self, succeeded: bool) {
        if succeeded {
            self.snapshot_writes += 1;
        } else {
            self.write_failures += 1;
        }
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
