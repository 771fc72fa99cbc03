//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Only `InvalidConfiguration` ever escapes a constructor. Storage problems
/// are absorbed by the cache facade and reported through logs and stats.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Snapshot on disk could not be decoded
    #[error("Storage corruption: {0}")]
    StorageCorruption(String),

    /// Snapshot could not be written to disk
    #[error("Failed to write snapshot {}: {source}", .path.display())]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Builds a `StorageWrite` error for the given path.
    pub fn storage_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CacheError::StorageWrite {
            path: path.into(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
