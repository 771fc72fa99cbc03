//! Disk-Backed Frecency Cache
//!
//! Thread-safe facade composing the frecency table, eviction policy and
//! snapshot persistence behind one exclusive lock.

use std::path::Path;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, EvictionPolicy, FrecencyTable};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::persistence::{LoadOutcome, PersistenceManager};

// == Cache State ==
/// Lifecycle of a cache instance.
///
/// Construction walks `Uninitialized -> Loading -> Ready`; a returned cache
/// is always `Ready`, whatever the snapshot on disk looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Loading,
    Ready,
}

/// Everything guarded by the cache lock.
#[derive(Debug, Default)]
struct CacheInner {
    table: FrecencyTable,
    stats: CacheStats,
    /// In-memory state differs from the last snapshot written
    dirty: bool,
}

// == Disk-Backed Frecency Cache ==
/// A bounded key-value cache with frecency eviction, mirrored to disk.
///
/// Every operation holds a single exclusive lock for its whole duration,
/// disk I/O included. Share an instance between threads with `Arc`.
///
/// # Example
/// ```no_run
/// use frecency_cache::{CacheConfig, DiskBackedFrecencyCache};
///
/// let config = CacheConfig::new(100, "completions").with_cache_dir("/tmp/cache");
/// let cache = DiskBackedFrecencyCache::new(config)?;
///
/// cache.set("prompt", "answer");
/// assert_eq!(cache.get("prompt"), Some("answer".into()));
/// # Ok::<(), frecency_cache::CacheError>(())
/// ```
#[derive(Debug)]
pub struct DiskBackedFrecencyCache {
    inner: Mutex<CacheInner>,
    persistence: PersistenceManager,
    policy: EvictionPolicy,
    state: CacheState,
    load_outcome: LoadOutcome,
}

impl DiskBackedFrecencyCache {
    // == Constructor ==
    /// Creates a cache and loads its snapshot.
    ///
    /// Only an invalid configuration (zero capacity, bad name or budget, an
    /// unusable directory) is an error. A missing or corrupt snapshot yields
    /// an empty cache.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache_dir = config.prepare_cache_dir()?;

        let mut cache = Self {
            inner: Mutex::new(CacheInner::default()),
            persistence: PersistenceManager::new(cache_dir, &config.cache_name),
            policy: EvictionPolicy::new(config.capacity, config.max_size_bytes()),
            state: CacheState::Uninitialized,
            load_outcome: LoadOutcome::Missing,
        };
        cache.load();

        Ok(cache)
    }

    // == Load ==
    fn load(&mut self) {
        self.state = CacheState::Loading;
        debug!("Loading cache from {}", self.persistence.path().display());

        let (mut table, outcome) = self.persistence.load();

        // The snapshot may predate a smaller capacity.
        let trimmed = self.policy.enforce_capacity(&mut table, None);
        if trimmed > 0 {
            info!(
                "Dropped {} entries exceeding capacity {} after load",
                trimmed,
                self.policy.capacity()
            );
        }

        let inner = self.inner.get_mut();
        inner.stats.record_capacity_evictions(trimmed);
        inner.dirty = trimmed > 0;
        inner.table = table;

        match outcome {
            LoadOutcome::Loaded(count) => info!(
                "Loaded {} cache entries from {}",
                count,
                self.persistence.path().display()
            ),
            LoadOutcome::Recovered => info!(
                "Discarded unreadable snapshot {}, cache starts empty",
                self.persistence.path().display()
            ),
            LoadOutcome::Missing => {}
        }

        self.load_outcome = outcome;
        self.state = CacheState::Ready;
    }

    // == Get ==
    /// Retrieves a value by key, counting the access.
    ///
    /// Returns None for absent keys. The access is persisted lazily, on the
    /// next write, `sync`, or drop.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.table.get(key).cloned() {
            Some(value) => {
                inner.stats.record_hit();
                inner.dirty = true;
                Some(value)
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    /// Retrieves a value and deserializes it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    // == Set ==
    /// Stores a value, evicts as needed, and writes the snapshot.
    ///
    /// A failed snapshot write is logged and counted in [`CacheStats`]; the
    /// value stays cached in memory either way.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        inner.table.set(key, value.into());
        inner.dirty = true;

        let evicted = self.policy.enforce_capacity(&mut inner.table, Some(key));
        inner.stats.record_capacity_evictions(evicted);

        let evicted = self.policy.enforce_size(&mut inner.table, Some(key), |table| {
            self.persistence.encoded_size(table)
        });
        inner.stats.record_size_evictions(evicted);

        self.persist_logged(inner);
    }

    /// Serializes `value` and stores it.
    pub fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value);
        Ok(())
    }

    // == Remove ==
    /// Removes one key and writes the snapshot if it was present.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let removed = inner.table.remove(key)?;
        inner.dirty = true;
        self.persist_logged(inner);
        Some(removed.value)
    }

    // == Sync ==
    /// Writes the current state to disk now. Failures are logged.
    pub fn sync(&self) {
        let mut guard = self.inner.lock();
        self.persist_logged(&mut guard);
    }

    /// Writes the current state to disk now, returning any write error.
    pub fn try_sync(&self) -> Result<()> {
        let mut guard = self.inner.lock();
        let result = self.persist(&mut guard);
        if let Err(e) = &result {
            warn!("Cache sync failed: {}", e);
        }
        result
    }

    // == Clear ==
    /// Empties the cache and deletes the snapshot file.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let count = inner.table.len();
        inner.table.clear();
        inner.dirty = false;

        if let Err(e) = self.persistence.delete() {
            warn!("Could not delete snapshot: {}", e);
            // An empty snapshot still hides the stale entries from a reload.
            inner.dirty = true;
            self.persist_logged(inner);
        }

        info!("Cleared {} cache entries", count);
    }

    // == Persistence Helpers ==
    fn persist(&self, inner: &mut CacheInner) -> Result<()> {
        let result = self.persistence.save(&inner.table);
        inner.stats.record_write(result.is_ok());
        if result.is_ok() {
            inner.dirty = false;
        }
        result
    }

    fn persist_logged(&self, inner: &mut CacheInner) {
        if let Err(e) = self.persist(inner) {
            warn!("Cache snapshot not written, keeping in-memory state: {}", e);
        }
    }

    // == Introspection ==
    /// Checks for a key without counting an access.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().table.contains_key(key)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().table.is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let guard = self.inner.lock();
        let mut stats = guard.stats.clone();
        stats.set_total_entries(guard.table.len());
        stats
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// What construction found on disk.
    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    pub fn snapshot_path(&self) -> &Path {
        self.persistence.path()
    }

    pub fn capacity(&self) -> usize {
        self.policy.capacity()
    }

    pub fn max_size_bytes(&self) -> Option<u64> {
        self.policy.max_size_bytes()
    }
}

impl Drop for DiskBackedFrecencyCache {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if !inner.dirty {
            return;
        }
        match self.persistence.save(&inner.table) {
            Ok(()) => debug!("Flushed cache to {} on drop", self.persistence.path().display()),
            Err(e) => warn!("Could not flush cache on drop: {}", e),
        }
    }
}
