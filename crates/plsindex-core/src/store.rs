//! Entity store abstraction.
//!
//! Backends persist JSON documents keyed by `(kind, id)`; [`EntityStoreExt`]
//! layers the typed load / save operations on top so every backend stays
//! object-safe. Saves are upserts, which is what makes replaying an event
//! idempotent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::entity::{Entity, LazyEntity};
use crate::error::IndexerError;

/// Trait for entity storage backends.
///
/// Implementations include [`MemoryEntityStore`] and the SQLite store in
/// `plsindex-storage`.
pub trait EntityStore: Send + Sync {
    /// Load the document for `(kind, id)`, if present.
    fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, IndexerError>;

    /// Save (upsert) the document for `(kind, id)`.
    fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), IndexerError>;

    /// All ids stored under `kind`, sorted.
    fn ids(&self, kind: &str) -> Result<Vec<String>, IndexerError>;
}

impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, IndexerError> {
        (**self).get(kind, id)
    }

    fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), IndexerError> {
        (**self).put(kind, id, value)
    }

    fn ids(&self, kind: &str) -> Result<Vec<String>, IndexerError> {
        (**self).ids(kind)
    }
}

/// Typed operations available on every [`EntityStore`].
pub trait EntityStoreExt: EntityStore {
    /// Load an entity by id.
    fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, IndexerError> {
        match self.get(E::KIND, id)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| IndexerError::Encoding {
                    kind: E::KIND,
                    id: id.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Load an entity that an earlier flow must have created.
    fn require<E: Entity>(&self, id: &str) -> Result<E, IndexerError> {
        self.load(id)?.ok_or_else(|| IndexerError::MissingEntity {
            kind: E::KIND,
            id: id.to_string(),
        })
    }

    /// Load an entity, or construct its default if it has never been seen.
    fn load_or_default<E: LazyEntity>(&self, id: &str) -> Result<E, IndexerError> {
        Ok(self.load(id)?.unwrap_or_else(|| E::with_default(id)))
    }

    /// Save (upsert) an entity.
    fn save<E: Entity>(&self, entity: &E) -> Result<(), IndexerError> {
        let value = serde_json::to_value(entity).map_err(|e| IndexerError::Encoding {
            kind: E::KIND,
            id: entity.id().to_string(),
            reason: e.to_string(),
        })?;
        self.put(E::KIND, entity.id(), value)
    }

    /// Load every entity of one kind, ordered by id.
    fn load_all<E: Entity>(&self) -> Result<Vec<E>, IndexerError> {
        let mut out = Vec::new();
        for id in self.ids(E::KIND)? {
            if let Some(entity) = self.load(&id)? {
                out.push(entity);
            }
        }
        Ok(out)
    }

    /// Number of stored entities of one kind.
    fn count(&self, kind: &str) -> Result<usize, IndexerError> {
        Ok(self.ids(kind)?.len())
    }
}

impl<T: EntityStore + ?Sized> EntityStoreExt for T {}

// ─── In-memory store ──────────────────────────────────────────────────────────

type Tables = HashMap<String, HashMap<String, serde_json::Value>>;

/// In-memory entity store for tests and ephemeral replays.
#[derive(Default)]
pub struct MemoryEntityStore {
    data: Mutex<Tables>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, IndexerError> {
        self.data
            .lock()
            .map_err(|_| IndexerError::Storage("memory store lock poisoned".into()))
    }
}

impl EntityStore for MemoryEntityStore {
    fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, IndexerError> {
        Ok(self.lock()?.get(kind).and_then(|m| m.get(id)).cloned())
    }

    fn put(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), IndexerError> {
        self.lock()?
            .entry(kind.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    fn ids(&self, kind: &str) -> Result<Vec<String>, IndexerError> {
        let mut ids: Vec<String> = self
            .lock()?
            .get(kind)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }
}
