//! Persistence Module
//!
//! Snapshot format and the manager that reads and writes it.

mod manager;
pub mod snapshot;

pub use manager::{LoadOutcome, PersistenceManager};
pub use snapshot::{Snapshot, SNAPSHOT_EXTENSION, SNAPSHOT_VERSION};
