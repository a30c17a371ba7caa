//! Queue registry.
//!
//! Resolves a durable queue name plus payload schema into a bound
//! [`QueueHandle`]. Schema descriptors form a closed set registered before
//! resolution; validation is eager so a bad binding fails at resolve time,
//! not on first use.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::codec::PayloadCodec;
use crate::core::engine::QueueEngine;
use crate::core::error::QueueError;
use crate::core::queue::QueueHandle;
use crate::core::schema::SchemaDescriptor;
use crate::core::session::Session;

/// Thread-safe registry of schema descriptors over a shared engine.
#[derive(Debug)]
pub struct QueueRegistry<E: QueueEngine> {
    engine: Arc<E>,
    schemas: DashMap<String, Arc<SchemaDescriptor>>,
}

impl<E: QueueEngine> QueueRegistry<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            schemas: DashMap::new(),
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Registers a payload schema into the closed descriptor set.
    pub fn register_schema(&self, descriptor: SchemaDescriptor) -> Arc<SchemaDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.schemas
            .insert(descriptor.name().to_owned(), Arc::clone(&descriptor));
        descriptor
    }

    pub fn schema(&self, name: &str) -> Option<Arc<SchemaDescriptor>> {
        self.schemas.get(name).map(|entry| Arc::clone(&*entry))
    }

    /// Resolves `queue` under `schema` into a bound handle.
    ///
    /// Fails with `NotFound` when either name is unknown and with
    /// `SchemaViolation` when the queue carries a different payload type.
    /// Idempotent: repeated resolution returns equivalent handles; multiple
    /// handles may reference the same durable queue concurrently.
    pub async fn resolve(
        &self,
        queue: &str,
        schema: &str,
    ) -> Result<QueueHandle<E>, QueueError> {
        let descriptor = self
            .schema(schema)
            .ok_or_else(|| QueueError::NotFound(format!("payload schema '{schema}'")))?;
        let spec = self.engine.lookup_queue(queue).await?;
        if spec.payload_schema != descriptor.name() {
            return Err(QueueError::SchemaViolation(format!(
                "queue '{queue}' carries payload type '{}', not '{schema}'",
                spec.payload_schema
            )));
        }
        debug!(target: "addrmq::registry", queue, schema, "bound queue handle");
        Ok(QueueHandle::new(
            spec,
            PayloadCodec::new(descriptor),
            Arc::clone(&self.engine),
        ))
    }

    /// Opens a fresh transaction context on the shared engine.
    pub fn open_session(&self) -> Session<E> {
        Session::begin(Arc::clone(&self.engine))
    }
}
