//! Event log emitter — immutable audit records keyed by event id.

use crate::entity::Entity;
use crate::error::IndexerError;
use crate::events::EventMeta;
use crate::store::{EntityStore, EntityStoreExt};

/// Canonical id of one log: `"{tx_hash}-{log_index}"`.
///
/// Unique per log in the chain's history and stable across replays.
pub fn event_id(meta: &EventMeta) -> String {
    format!("{}-{}", meta.tx_hash, meta.log_index)
}

/// Write an audit record. Records are never read back or mutated.
pub fn append<S, R>(store: &S, record: &R) -> Result<(), IndexerError>
where
    S: EntityStore + ?Sized,
    R: Entity,
{
    store.save(record)?;
    tracing::debug!(kind = R::KIND, id = record.id(), "audit record written");
    Ok(())
}
