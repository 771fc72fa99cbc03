//! Cache Module
//!
//! Provides the in-memory frecency table and its eviction policy.

mod entry;
mod eviction;
mod frecency;
mod stats;
mod table;


// Re-export public types
pub use entry::FrecencyEntry;
pub use eviction::{EvictionPolicy, SIZE_EVICTION_PERCENT};
pub use frecency::FrecencyTracker;
pub use stats::CacheStats;
pub use table::FrecencyTable;
