//! Frecency Cache - A disk-backed key-value cache
//!
//! Bounded in-memory storage with frequency+recency eviction, mirrored to a
//! single JSON snapshot so cached values survive restarts.

pub mod cache;
pub mod config;
pub mod disk_cache;
pub mod error;
pub mod persistence;

pub use cache::{CacheStats, FrecencyEntry};
pub use config::CacheConfig;
pub use disk_cache::{CacheState, DiskBackedFrecencyCache};
pub use error::{CacheError, Result};
pub use persistence::LoadOutcome;
