//! Persistence Manager
//!
//! Mirrors a frecency table to a single snapshot file with atomic writes
//! and silent recovery from unreadable snapshots.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::cache::FrecencyTable;
use crate::error::{CacheError, Result};
use crate::persistence::snapshot::{self, SNAPSHOT_EXTENSION};

// == Load Outcome ==
/// What `load` found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot file existed
    Missing,
    /// A snapshot was read with this many entries
    Loaded(usize),
    /// The snapshot was unreadable and an empty table was used instead
    Recovered,
}

// == Persistence Manager ==
/// Owns the snapshot path of one cache instance.
#[derive(Debug, Clone)]
pub struct PersistenceManager {
    path: PathBuf,
}

impl PersistenceManager {
    // == Constructor ==
    /// Creates a manager for `<cache_dir>/<cache_name>.json`.
    pub fn new(cache_dir: &Path, cache_name: &str) -> Self {
        Self {
            path: cache_dir.join(format!("{}.{}", cache_name, SNAPSHOT_EXTENSION)),
        }
    }

    /// Returns the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Save ==
    /// Writes the whole table to the snapshot file atomically.
    ///
    /// The payload goes to a temporary file in the same directory, is
    /// flushed to disk, and then renamed over the snapshot, so readers only
    /// ever see the previous or the new snapshot.
    pub fn save(&self, table: &FrecencyTable) -> Result<()> {
        let payload = snapshot::encode(table)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| CacheError::storage_write(dir, e))?;

        let mut temp =
            NamedTempFile::new_in(dir).map_err(|e| CacheError::storage_write(dir, e))?;
        temp.write_all(&payload)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| CacheError::storage_write(temp.path(), e))?;

        // Dropping `temp` on any failure removes the temporary file.
        temp.persist(&self.path)
            .map_err(|e| CacheError::storage_write(&self.path, e.error))?;

        debug!(
            "Saved snapshot {} ({} entries, {} bytes)",
            self.path.display(),
            table.len(),
            payload.len()
        );
        Ok(())
    }

    // == Load ==
    /// Reads the snapshot file into a table.
    ///
    /// Never fails: a missing file yields an empty table, and an unreadable
    /// or undecodable one is logged and replaced by an empty table.
    pub fn load(&self) -> (FrecencyTable, LoadOutcome) {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", self.path.display());
                return (FrecencyTable::new(), LoadOutcome::Missing);
            }
            Err(e) => {
                warn!(
                    "Could not read snapshot {}: {}; starting empty",
                    self.path.display(),
                    e
                );
                return (FrecencyTable::new(), LoadOutcome::Recovered);
            }
        };

        match snapshot::decode(&bytes) {
            Ok(record) => {
                let table = record.into_table();
                let count = table.len();
                (table, LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!("{} at {}; starting empty", e, self.path.display());
                (FrecencyTable::new(), LoadOutcome::Recovered)
            }
        }
    }

    // == Delete ==
    /// Removes the snapshot file. An absent file is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::storage_write(&self.path, e)),
        }
    }

    // == Encoded Size ==
    /// Returns the byte length the table would occupy on disk.
    pub fn encoded_size(&self, table: &FrecencyTable) -> u64 {
        match snapshot::encode(table) {
            Ok(bytes) => bytes.len() as u64,
            Err(e) => {
                warn!("Could not measure snapshot size: {}", e);
                0
            }
        }
    }
}
