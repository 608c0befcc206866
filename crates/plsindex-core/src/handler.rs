//! Event handler trait, registry, and the projection handler.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::IndexerError;
use crate::events::{schema, RegistrarEvent};
use crate::label::NameLookup;
use crate::projector::Projector;
use crate::store::EntityStore;
use crate::types::IndexContext;

/// A decoded blockchain log as delivered by the ingestion engine.
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    /// The schema/event name (e.g. `"NameRegistered"`).
    pub schema: String,
    /// Contract address that emitted the event.
    pub address: String,
    /// Transaction hash.
    pub tx_hash: String,
    /// Block number.
    pub block_number: u64,
    /// Log index within the block.
    pub log_index: u32,
    /// ABI-decoded fields keyed by parameter name.
    pub fields_json: serde_json::Value,
}

/// Trait for event handlers.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called for each decoded event that matches the handler's schema.
    async fn handle(&self, event: &DecodedEvent, ctx: &IndexContext) -> Result<(), IndexerError>;

    /// The event schema name this handler processes (e.g. `"NameRegistered"`).
    fn schema_name(&self) -> &str;
}

/// Registry of event handlers keyed by schema name.
pub struct HandlerRegistry {
    event_handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            event_handlers: HashMap::new(),
        }
    }

    /// Register an event handler for its schema name.
    pub fn on_event(&mut self, handler: Arc<dyn EventHandler>) {
        self.event_handlers
            .entry(handler.schema_name().to_string())
            .or_default()
            .push(handler);
    }

    /// Returns `true` if at least one handler is registered for `schema`.
    pub fn handles(&self, schema: &str) -> bool {
        self.event_handlers.contains_key(schema)
    }

    /// Dispatch an event to all matching handlers, in registration order.
    ///
    /// The first handler error aborts dispatch and is returned to the caller,
    /// which owns retry policy for the block range.
    pub async fn dispatch_event(
        &self,
        event: &DecodedEvent,
        ctx: &IndexContext,
    ) -> Result<(), IndexerError> {
        if let Some(handlers) = self.event_handlers.get(&event.schema) {
            for handler in handlers {
                handler.handle(event, ctx).await?;
            }
        }
        Ok(())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Projection handler ───────────────────────────────────────────────────────

/// Decodes one schema and applies it through a shared [`Projector`].
pub struct ProjectionHandler<S, L> {
    schema: &'static str,
    projector: Arc<Projector<S, L>>,
}

impl<S, L> ProjectionHandler<S, L> {
    pub fn new(schema: &'static str, projector: Arc<Projector<S, L>>) -> Self {
        Self { schema, projector }
    }
}

#[async_trait]
impl<S, L> EventHandler for ProjectionHandler<S, L>
where
    S: EntityStore + 'static,
    L: NameLookup + 'static,
{
    async fn handle(&self, event: &DecodedEvent, ctx: &IndexContext) -> Result<(), IndexerError> {
        tracing::debug!(
            schema = %event.schema,
            address = %event.address,
            block = ctx.block.number,
            log_index = event.log_index,
            "projecting event"
        );
        let decoded = RegistrarEvent::decode(event, ctx)?;
        self.projector.apply(&decoded)
    }

    fn schema_name(&self) -> &str {
        self.schema
    }
}

/// Register a projection handler for every registrar schema.
pub fn register_projector<S, L>(registry: &mut HandlerRegistry, projector: Arc<Projector<S, L>>)
where
    S: EntityStore + 'static,
    L: NameLookup + 'static,
{
    for name in schema::ALL {
        registry.on_event(Arc::new(ProjectionHandler::new(name, projector.clone())));
    }
}
