//! Persistence - snapshot format and storage backends
//!
//! Saving is best effort and loading fails soft: a missing or corrupt save
//! yields the default state, never an error that stops startup.

pub mod snapshot;
pub mod storage;

pub use snapshot::{decode, encode, load, save, LoadOutcome, PersistedSnapshot};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
