//! plsindex-core — projects `.pls` registrar events into an entity graph.
//!
//! # Architecture
//!
//! ```text
//! HandlerRegistry → ProjectionHandler → Projector
//!                                          ├── identity   (label / domain key codec)
//!                                          ├── label      (label gate, name lookup)
//!                                          ├── lifecycle  (register / renew / transfer)
//!                                          ├── preimage   (controller plaintext names)
//!                                          ├── referral   (referrer counters)
//!                                          ├── compliance (blacklist flags)
//!                                          ├── eventlog   (immutable audit records)
//!                                          └── EntityStore (memory / SQLite)
//! ```
//!
//! Projection is synchronous: each event is loaded, mutated and persisted
//! before the next one is handed over by the ingestion side.

pub mod config;
pub mod entity;
pub mod error;
pub mod eventlog;
pub mod events;
pub mod handler;
pub mod identity;
pub mod label;
pub mod projector;
pub mod store;
pub mod types;

pub use config::{RegistrarConfig, DEFAULT_TLD, GRACE_PERIOD_SECONDS};
pub use entity::{Account, Blacklist, Domain, Entity, LazyEntity, Referrer, Registration};
pub use error::IndexerError;
pub use events::{EventMeta, RegistrarEvent};
pub use handler::{register_projector, DecodedEvent, EventHandler, HandlerRegistry};
pub use label::{is_valid_label, NameLookup, NoNameLookup, RainbowTable};
pub use projector::Projector;
pub use store::{EntityStore, EntityStoreExt, MemoryEntityStore};
pub use types::{BlockSummary, IndexContext};
