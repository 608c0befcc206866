//! SQLite-backed entity store.
//!
//! Every entity kind shares one table; documents are stored as JSON.
//!
//! ## Schema
//! ```sql
//! CREATE TABLE entities (
//!     kind TEXT NOT NULL,
//!     id   TEXT NOT NULL,
//!     data TEXT NOT NULL,
//!     PRIMARY KEY (kind, id)
//! );
//! ```
//!
//! # Usage
//! ```rust,no_run
//! use plsindex_storage::sqlite::SqliteEntityStore;
//!
//! # fn example() -> Result<(), plsindex_core::IndexerError> {
//! // File-backed (persistent)
//! let store = SqliteEntityStore::open("./pls.db")?;
//!
//! // In-memory (tests / ephemeral)
//! let store = SqliteEntityStore::in_memory()?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use plsindex_core::error::IndexerError;
use plsindex_core::store::EntityStore;

/// SQLite-backed entity store.
///
/// The connection sits behind a `Mutex`; projection is sequential so there is
/// no contention in practice.
pub struct SqliteEntityStore {
    conn: Mutex<Connection>,
}

impl SqliteEntityStore {
    /// Open (or create) an entity database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IndexerError> {
        let conn = Connection::open(path.as_ref()).map_err(sqlite_err)?;
        Self::init(conn)
    }

    /// Open an in-memory database. All data is lost when the store is dropped.
    pub fn in_memory() -> Result<Self, IndexerError> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, IndexerError> {
        // WAL mode — readers (the query layer) do not block the projector
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(sqlite_err)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS entities (
                kind TEXT NOT NULL,
                id   TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            );",
        )
        .map_err(sqlite_err)?;

        debug!("sqlite entity store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, IndexerError> {
        self.conn
            .lock()
            .map_err(|_| IndexerError::Storage("sqlite connection lock poisoned".into()))
    }

    /// Total number of stored documents across all kinds.
    pub fn len(&self) -> Result<usize, IndexerError> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM entities", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(sqlite_err)
    }

    pub fn is_empty(&self) -> Result<bool, IndexerError> {
        Ok(self.len()? == 0)
    }
}

impl EntityStore for SqliteEntityStore {
    fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, IndexerError> {
        let conn = self.conn()?;
        let data = conn
            .query_row(
                "SELECT data FROM entities WHERE kind = ?1 AND id = ?2",
                params![kind, id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(sqlite_err)?;

        data.map(|json| {
            serde_json::from_str(&json).map_err(|e| {
                IndexerError::Storage(format!("corrupt document {kind} '{id}': {e}"))
            })
        })
        .transpose()
    }

    fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), IndexerError> {
        let json = value.to_string();
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO entities (kind, id, data) VALUES (?1, ?2, ?3)",
            params![kind, id, &json],
        )
        .map_err(sqlite_err)?;
        Ok(())
    }

    fn ids(&self, kind: &str) -> Result<Vec<String>, IndexerError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id FROM entities WHERE kind = ?1 ORDER BY id")
            .map_err(sqlite_err)?;
        let rows = stmt
            .query_map(params![kind], |row| row.get::<_, String>(0))
            .map_err(sqlite_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn sqlite_err(e: rusqlite::Error) -> IndexerError {
    IndexerError::Storage(e.to_string())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
