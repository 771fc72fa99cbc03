//! Snapshot Format
//!
//! On-disk record for a frecency table: a JSON object whose `data` field
//! maps every key to its value, frequency and recency.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{FrecencyEntry, FrecencyTable};
use crate::error::{CacheError, Result};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File extension of snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "json";

// == Borrowed Record ==
/// Encoding view over a live table; borrows instead of cloning values.
#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    clock: u64,
    data: BTreeMap<&'a str, &'a FrecencyEntry>,
}

// == Owned Record ==
/// A decoded snapshot.
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clock: u64,
    pub data: BTreeMap<String, FrecencyEntry>,
}

impl Snapshot {
    /// Turns the record back into a table.
    ///
    /// The stored `clock` is informational; restore renumbers recencies.
    pub fn into_table(self) -> FrecencyTable {
        FrecencyTable::restore(self.data)
    }
}

// == Encode ==
/// Serializes a table into snapshot bytes.
pub fn encode(table: &FrecencyTable) -> Result<Vec<u8>> {
    let record = SnapshotRef {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        clock: table.clock(),
        data: table.snapshot().into_iter().collect(),
    };
    Ok(serde_json::to_vec(&record)?)
}

// == Decode ==
/// Parses snapshot bytes.
///
/// Anything that is not a complete record of a known version is reported
/// as `StorageCorruption`.
pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)
        .map_err(|e| CacheError::StorageCorruption(format!("undecodable snapshot: {}", e)))?;

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(CacheError::StorageCorruption(format!(
            "unsupported snapshot version {}",
            snapshot.version
        )));
    }

    Ok(snapshot)
}
