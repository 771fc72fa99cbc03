//! Eviction Policy Module
//!
//! Enforces the entry-count and serialized-size bounds on a frecency table.

use tracing::{debug, warn};

use crate::cache::FrecencyTable;

/// Share of entries removed in one size-eviction pass, in percent.
pub const SIZE_EVICTION_PERCENT: usize = 20;

// == Eviction Policy ==
/// Decides which entries to drop when a table outgrows its bounds.
///
/// Both passes take a `protect` key, normally the key the caller just
/// wrote, which is never chosen as a victim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    /// Maximum number of live entries
    capacity: usize,
    /// Optional budget on the encoded table size
    max_size_bytes: Option<u64>,
}

impl EvictionPolicy {
    // == Constructor ==
    pub fn new(capacity: usize, max_size_bytes: Option<u64>) -> Self {
        Self {
            capacity,
            max_size_bytes,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_bytes
    }

    // == Capacity Eviction ==
    /// Removes lowest-ranked entries until the table fits `capacity`.
    ///
    /// Returns the number of entries evicted. After a single insert this is
    /// at most one.
    pub fn enforce_capacity(&self, table: &mut FrecencyTable, protect: Option<&str>) -> usize {
        let mut evicted = 0;
        while table.len() > self.capacity {
            match table.evict_lowest(protect) {
                Some(key) => {
                    debug!("Capacity eviction: dropped {:?}", key);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    // == Size Eviction ==
    /// Drops a batch of the lowest-ranked entries if the table is over budget.
    ///
    /// `measure` returns the encoded size of a table in bytes. It is called
    /// once before the batch and once after; the table is not driven all the
    /// way under budget if one batch is not enough.
    ///
    /// Returns the number of entries evicted.
    pub fn enforce_size<F>(
        &self,
        table: &mut FrecencyTable,
        protect: Option<&str>,
        measure: F,
    ) -> usize
    where
        F: Fn(&FrecencyTable) -> u64,
    {
        let Some(budget) = self.max_size_bytes else {
            return 0;
        };

        let size = measure(table);
        if size <= budget {
            return 0;
        }

        let victims = table.lowest_ranked(Self::batch_size(table.len()), protect);
        let evicted = victims.len();
        for key in &victims {
            table.remove(key);
        }

        let remaining = measure(table);
        debug!(
            "Size eviction: dropped {} entries, {} -> {} bytes (budget {})",
            evicted, size, remaining, budget
        );
        if remaining > budget {
            warn!(
                "Cache still over size budget after eviction: {} > {} bytes",
                remaining, budget
            );
        }

        evicted
    }

    /// Number of entries one size-eviction pass removes from `len` entries.
    pub fn batch_size(len: usize) -> usize {
        (len * SIZE_EVICTION_PERCENT).div_ceil(100).max(1)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled_table(n: usize) -> FrecencyTable {
        let mut table = FrecencyTable::new();
        for i in 0..n {
            table.set(&format!("key{}", i), json!(i));
        }
        table
    }

    /// Pretends every entry weighs 100 bytes.
    fn hundred_bytes_each(table: &FrecencyTable) -> u64 {
        table.len() as u64 * 100
    }

    #[test]
    fn test_batch_size_rounds_up() {
        assert_eq!(EvictionPolicy::batch_size(0), 1);
        assert_eq!(EvictionPolicy::batch_size(1), 1);
        assert_eq!(EvictionPolicy::batch_size(5), 1);
        assert_eq!(EvictionPolicy::batch_size(6), 2);
        assert_eq!(EvictionPolicy::batch_size(10), 2);
        assert_eq!(EvictionPolicy::batch_size(18), 4);
    }

    #[test]
    fn test_capacity_evicts_lowest() {
        let policy = EvictionPolicy::new(3, None);
        let mut table = filled_table(3);
        table.get("key0");

        table.set("key3", json!(3));
        let evicted = policy.enforce_capacity(&mut table, Some("key3"));

        assert_eq!(evicted, 1);
        assert_eq!(table.len(), 3);
        assert!(!table.contains_key("key1"));
        assert!(table.contains_key("key0"));
        assert!(table.contains_key("key3"));
    }

    #[test]
    fn test_capacity_protects_new_key() {
        let policy = EvictionPolicy::new(2, None);
        let mut table = filled_table(2);
        // Both residents outrank any fresh insert
        table.get("key0");
        table.get("key1");

        table.set("new", json!("n"));
        policy.enforce_capacity(&mut table, Some("new"));

        assert!(table.contains_key("new"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_capacity_shrinks_oversized_table() {
        let policy = EvictionPolicy::new(2, None);
        let mut table = filled_table(5);

        let evicted = policy.enforce_capacity(&mut table, None);

        assert_eq!(evicted, 3);
        assert!(table.contains_key("key3"));
        assert!(table.contains_key("key4"));
    }

    #[test]
    fn test_size_disabled_without_budget() {
        let policy = EvictionPolicy::new(100, None);
        let mut table = filled_table(50);

        assert_eq!(policy.enforce_size(&mut table, None, hundred_bytes_each), 0);
        assert_eq!(table.len(), 50);
    }

    #[test]
    fn test_size_under_budget_is_noop() {
        let policy = EvictionPolicy::new(100, Some(1_000));
        let mut table = filled_table(10);

        assert_eq!(policy.enforce_size(&mut table, None, hundred_bytes_each), 0);
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn test_size_evicts_one_batch() {
        let policy = EvictionPolicy::new(100, Some(1_000));
        let mut table = filled_table(20);

        let evicted = policy.enforce_size(&mut table, Some("key19"), hundred_bytes_each);

        // One pass of 20%, even though 16 entries are still over budget
        assert_eq!(evicted, 4);
        assert_eq!(table.len(), 16);
        for i in 0..4 {
            assert!(!table.contains_key(&format!("key{}", i)));
        }
        assert!(table.contains_key("key19"));
    }

    #[test]
    fn test_size_never_evicts_protected_single_entry() {
        let policy = EvictionPolicy::new(100, Some(10));
        let mut table = filled_table(1);

        let evicted = policy.enforce_size(&mut table, Some("key0"), hundred_bytes_each);

        assert_eq!(evicted, 0);
        assert_eq!(table.len(), 1);
    }
}
