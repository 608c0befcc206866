//! plsindex-storage — pluggable entity-store backends.
//!
//! Backends:
//! - [`MemoryEntityStore`] — in-memory (dev/testing, no persistence)
//! - [`sqlite`] — SQLite via `rusqlite` (embedded, single-file persistence)

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use plsindex_core::store::MemoryEntityStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteEntityStore;
