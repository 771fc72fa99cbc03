//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with frecency bookkeeping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Frecency Entry ==
/// A stored value together with its access bookkeeping.
///
/// This is also the on-disk shape of one entry under the snapshot's `data`
/// field, so frequency and recency survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrecencyEntry {
    /// The stored value
    pub value: Value,
    /// Number of accesses, including the initial write
    pub frequency: u64,
    /// Logical clock tick of the latest access
    pub recency: u64,
}

impl FrecencyEntry {
    // == Constructor ==
    /// Creates an entry for a first write at the given tick.
    pub fn new(value: Value, tick: u64) -> Self {
        Self {
            value,
            frequency: 1,
            recency: tick,
        }
    }

    // == Touch ==
    /// Records an access at the given tick.
    ///
    /// Frequency saturates rather than wrapping so the rank never decreases.
    pub fn touch(&mut self, tick: u64) {
        self.frequency = self.frequency.saturating_add(1);
        self.recency = self.recency.max(tick);
    }

    // == Rank ==
    /// Returns the eviction rank; lower ranks are evicted first.
    pub fn rank(&self) -> (u64, u64) {
        (self.frequency, self.recency)
    }
}
