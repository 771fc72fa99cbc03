//! Configuration Module
//!
//! Handles constructor-time cache configuration, loaded from code or from
//! environment variables.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};

/// Directory name used under the platform cache directory.
pub const DEFAULT_CACHE_SUBDIR: &str = "frecency_cache";

/// Cache configuration parameters.
///
/// Fixed for the lifetime of a cache instance; there is no runtime
/// reconfiguration.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// Snapshot file stem, `<cache_dir>/<cache_name>.json`
    pub cache_name: String,
    /// Directory holding the snapshot file
    pub cache_dir: PathBuf,
    /// Optional soft budget on the encoded snapshot size, in megabytes
    pub max_size_mb: Option<f64>,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a config with the default cache directory and no size budget.
    pub fn new(capacity: usize, cache_name: impl Into<String>) -> Self {
        Self {
            capacity,
            cache_name: cache_name.into(),
            cache_dir: default_cache_dir(),
            max_size_mb: None,
        }
    }

    /// Sets the directory the snapshot file lives in.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Enables size-based eviction with the given budget.
    pub fn with_max_size_mb(mut self, max_size_mb: f64) -> Self {
        self.max_size_mb = Some(max_size_mb);
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FRECENCY_CACHE_CAPACITY` - Maximum entries (default: 1000)
    /// - `FRECENCY_CACHE_NAME` - Snapshot name (default: "default")
    /// - `FRECENCY_CACHE_DIR` - Snapshot directory (default: platform cache dir)
    /// - `FRECENCY_CACHE_MAX_SIZE_MB` - Size budget (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("FRECENCY_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            cache_name: env::var("FRECENCY_CACHE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_name),
            cache_dir: env::var_os("FRECENCY_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            max_size_mb: env::var("FRECENCY_CACHE_MAX_SIZE_MB")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    // == Validate ==
    /// Checks the configuration without touching the filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be a positive integer".to_string(),
            ));
        }

        if self.cache_name.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "cache_name must not be empty".to_string(),
            ));
        }

        // The name becomes a file stem and must not escape cache_dir.
        if self.cache_name == "."
            || self.cache_name == ".."
            || self.cache_name.contains(['/', '\\', '\0'])
        {
            return Err(CacheError::InvalidConfiguration(format!(
                "cache_name {:?} is not a valid file name",
                self.cache_name
            )));
        }

        if let Some(mb) = self.max_size_mb {
            if !mb.is_finite() || mb <= 0.0 {
                return Err(CacheError::InvalidConfiguration(format!(
                    "max_size_mb must be a positive number, got {}",
                    mb
                )));
            }
        }

        Ok(())
    }

    // == Prepare Directory ==
    /// Creates the cache directory if needed.
    ///
    /// Fails with `InvalidConfiguration` when the path exists as a file or
    /// cannot be created.
    pub fn prepare_cache_dir(&self) -> Result<&Path> {
        let dir = self.cache_dir.as_path();
        if dir.exists() && !dir.is_dir() {
            return Err(CacheError::InvalidConfiguration(format!(
                "cache_dir {} is not a directory",
                dir.display()
            )));
        }

        std::fs::create_dir_all(dir).map_err(|e| {
            CacheError::InvalidConfiguration(format!(
                "cache_dir {} is unusable: {}",
                dir.display(),
                e
            ))
        })?;

        Ok(dir)
    }

    /// Returns the size budget in bytes, if one is configured.
    pub fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_mb.map(|mb| (mb * 1024.0 * 1024.0).round() as u64)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(1000, "default")
    }
}

/// Returns the platform cache directory for snapshots.
///
/// Falls back to `~/.cache` and finally to the working directory.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CACHE_SUBDIR)
}
