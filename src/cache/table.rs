//! Frecency Table Module
//!
//! In-memory key-value storage combining a HashMap with frecency rank tracking.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::{FrecencyEntry, FrecencyTracker};

// == Frecency Table ==
/// In-memory map from key to value plus access bookkeeping.
///
/// The table never fails and never evicts on its own; bounds are enforced
/// by [`EvictionPolicy`](crate::cache::EvictionPolicy).
#[derive(Debug, Default)]
pub struct FrecencyTable {
    /// Key-value storage
    entries: HashMap<String, FrecencyEntry>,
    /// Rank index over the entries
    tracker: FrecencyTracker,
    /// Next recency tick to hand out
    clock: u64,
}

impl FrecencyTable {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Restore ==
    /// Rebuilds a table from persisted entries.
    ///
    /// Recencies are renumbered densely from 0 in rank order, so the relative
    /// order survives while the clock restarts at the entry count. Stored
    /// ticks, however large or duplicated, never reach the live clock.
    pub fn restore<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, FrecencyEntry)>,
    {
        let mut restored: Vec<(String, FrecencyEntry)> = entries.into_iter().collect();
        restored.sort_by(|a, b| a.1.rank().cmp(&b.1.rank()).then_with(|| a.0.cmp(&b.0)));

        let mut table = Self::new();
        for (key, mut entry) in restored {
            entry.recency = table.tick();
            table.tracker.insert(&key, entry.rank());
            table.entries.insert(key, entry);
        }

        table
    }

    fn tick(&mut self) -> u64 {
        let tick = self.clock;
        self.clock = self.clock.saturating_add(1);
        tick
    }

    // == Set ==
    /// Stores a value.
    ///
    /// A new key starts at frequency 1. Overwriting an existing key replaces
    /// the value and counts as an access.
    pub fn set(&mut self, key: &str, value: Value) {
        let tick = self.tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                let old_rank = entry.rank();
                entry.value = value;
                entry.touch(tick);
                self.tracker.reposition(old_rank, entry.rank());
            }
            None => {
                let entry = FrecencyEntry::new(value, tick);
                self.tracker.insert(key, entry.rank());
                self.entries.insert(key.to_string(), entry);
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key, recording the access on a hit.
    pub fn get(&mut self, key: &str) -> Option<&Value> {
        if !self.entries.contains_key(key) {
            return None;
        }

        let tick = self.tick();
        let entry = self.entries.get_mut(key)?;
        let old_rank = entry.rank();
        entry.touch(tick);
        self.tracker.reposition(old_rank, entry.rank());
        Some(&entry.value)
    }

    // == Peek ==
    /// Retrieves an entry without touching its bookkeeping.
    pub fn peek(&self, key: &str) -> Option<&FrecencyEntry> {
        self.entries.get(key)
    }

    // == Remove ==
    /// Removes an entry by key. Absent keys are ignored.
    pub fn remove(&mut self, key: &str) -> Option<FrecencyEntry> {
        let entry = self.entries.remove(key)?;
        self.tracker.remove(entry.rank());
        Some(entry)
    }

    // == Eviction Queries ==
    /// Removes the lowest-ranked entry other than `protect`.
    ///
    /// Returns the evicted key, or None when nothing is eligible.
    pub fn evict_lowest(&mut self, protect: Option<&str>) -> Option<String> {
        let key = self.tracker.lowest(1, protect).into_iter().next()?;
        self.remove(&key);
        Some(key)
    }

    /// Returns up to `n` lowest-ranked keys other than `protect`.
    pub fn lowest_ranked(&self, n: usize, protect: Option<&str>) -> Vec<String> {
        self.tracker.lowest(n, protect)
    }

    // == Snapshot ==
    /// Full dump of the table ordered by eviction rank, lowest first.
    pub fn snapshot(&self) -> Vec<(&str, &FrecencyEntry)> {
        self.tracker
            .iter()
            .filter_map(|(_, key)| self.entries.get_key_value(key.as_str()))
            .map(|(key, entry)| (key.as_str(), entry))
            .collect()
    }

    /// Returns the next recency tick the table would hand out.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Clear ==
    /// Drops every entry. The clock keeps running.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tracker.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys_in_rank_order(table: &FrecencyTable) -> Vec<String> {
        table
            .snapshot()
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect()
    }

    #[test]
    fn test_table_new() {
        let table = FrecencyTable::new();
        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        assert_eq!(table.clock(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut table = FrecencyTable::new();

        table.set("key1", json!("value1"));
        assert_eq!(table.get("key1"), Some(&json!("value1")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let mut table = FrecencyTable::new();
        assert_eq!(table.get("missing"), None);
        // A miss does not consume a tick
        assert_eq!(table.clock(), 0);
    }

    #[test]
    fn test_get_records_access() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        table.get("a");
        table.get("a");

        let entry = table.peek("a").unwrap();
        assert_eq!(entry.frequency, 3);
        assert_eq!(entry.recency, 2);
    }

    #[test]
    fn test_peek_does_not_record_access() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        let before = table.peek("a").unwrap().rank();
        let _ = table.peek("a");

        assert_eq!(table.peek("a").unwrap().rank(), before);
    }

    #[test]
    fn test_overwrite_counts_as_access() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        table.set("a", json!(2));

        let entry = table.peek("a").unwrap();
        assert_eq!(entry.value, json!(2));
        assert_eq!(entry.frequency, 2);
        assert_eq!(entry.recency, 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        assert!(table.remove("a").is_some());
        assert!(table.remove("a").is_none());
        assert!(table.is_empty());
        assert!(table.lowest_ranked(1, None).is_empty());
    }

    #[test]
    fn test_snapshot_is_rank_ordered() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        table.set("b", json!(2));
        table.set("c", json!(3));
        table.get("a");
        table.get("a");
        table.get("c");

        assert_eq!(keys_in_rank_order(&table), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_evict_lowest_respects_protect() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        table.set("b", json!(2));

        assert_eq!(table.evict_lowest(Some("a")), Some("b".to_string()));
        assert_eq!(table.evict_lowest(Some("a")), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_restore_renumbers_recency() {
        let entries = vec![
            ("a".to_string(), FrecencyEntry { value: json!(1), frequency: 4, recency: 5 }),
            ("b".to_string(), FrecencyEntry { value: json!(2), frequency: 1, recency: 1 }),
        ];

        let mut table = FrecencyTable::restore(entries);
        assert_eq!(table.clock(), 2);
        assert_eq!(table.peek("b").unwrap().rank(), (1, 0));
        assert_eq!(table.peek("a").unwrap().rank(), (4, 1));

        table.set("c", json!(3));
        assert_eq!(table.peek("c").unwrap().recency, 2);
        assert_eq!(keys_in_rank_order(&table), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_restore_separates_colliding_ranks() {
        let entries = vec![
            ("a".to_string(), FrecencyEntry { value: json!(1), frequency: 1, recency: 3 }),
            ("b".to_string(), FrecencyEntry { value: json!(2), frequency: 1, recency: 3 }),
        ];

        let table = FrecencyTable::restore(entries);

        assert_eq!(table.len(), 2);
        assert_eq!(keys_in_rank_order(&table), vec!["a", "b"]);
        assert_ne!(table.peek("a").unwrap().rank(), table.peek("b").unwrap().rank());
    }

    #[test]
    fn test_restore_huge_recency_keeps_ranks_unique() {
        let entries = vec![
            ("a".to_string(), FrecencyEntry { value: json!(1), frequency: 1, recency: u64::MAX }),
            ("b".to_string(), FrecencyEntry { value: json!(2), frequency: 1, recency: u64::MAX - 1 }),
        ];

        let mut table = FrecencyTable::restore(entries);
        assert_eq!(table.clock(), 2);

        for key in ["c", "d", "e"] {
            table.set(key, json!(key));
        }

        // Every key is indexed, so each one can still be chosen as a victim
        assert_eq!(table.len(), 5);
        assert_eq!(table.lowest_ranked(10, None).len(), 5);
        assert_eq!(keys_in_rank_order(&table), vec!["b", "a", "c", "d", "e"]);
    }

    #[test]
    fn test_clear_keeps_clock() {
        let mut table = FrecencyTable::new();

        table.set("a", json!(1));
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.clock(), 1);
    }
}
