//! Storage engine seam.
//!
//! All durable queue state lives behind [`QueueEngine`]; the queue core is
//! stateless between calls and never caches or locally mutates message
//! state. Every query reflects committed engine state at call time.
//!
//! In production the implementor is an external database engine reached over
//! its own RPC; [`MemoryEngine`] is the transactional in-memory reference
//! used for embedding and tests.

pub mod memory;

pub use memory::MemoryEngine;

use bytes::Bytes;

use crate::core::error::QueueError;
use crate::core::filter::ConsumerFilter;
use crate::core::message::{ConsumerName, MessageId};

/// Consumption mode fixed at queue provisioning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerMode {
    /// Every message goes to whichever consumer dequeues it first.
    Single,
    /// Each message is independently addressed to a subset of named
    /// consumers.
    Multi,
}

/// Administrative description of a durable queue.
#[derive(Debug, Clone)]
pub struct QueueSpec {
    /// Durable queue name.
    pub name: String,
    /// Name of the payload schema bound to this queue.
    pub payload_schema: String,
    pub mode: ConsumerMode,
    /// Implicit subscriber list consulted for messages enqueued with an
    /// empty recipient list. Administrative fact, not engine state.
    pub default_subscribers: Vec<ConsumerName>,
}

/// A message submitted to the engine, not yet committed.
#[derive(Debug, Clone)]
pub struct PendingMessage {
    pub wire: Bytes,
    pub recipients: Vec<ConsumerName>,
}

/// A committed message as returned by the engine.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: MessageId,
    pub wire: Bytes,
    pub recipients: Vec<ConsumerName>,
    pub enqueued_at: u64,
}

/// Transaction context identifier. One logical transaction per caller
/// session; commit is always an explicit operation.
pub type TxnId = u64;

/// Capability contract offered by the storage engine.
///
/// Calls are awaitable and transactional: enqueued messages stay pending
/// under their transaction id until [`commit`](Self::commit) publishes them
/// atomically. Implementations must be `Send + Sync`; the same engine is
/// shared by every handle and session.
#[allow(async_fn_in_trait)]
pub trait QueueEngine: Send + Sync + 'static {
    /// Resolves a provisioned queue by durable name.
    async fn lookup_queue(&self, name: &str) -> Result<QueueSpec, QueueError>;

    /// Buffers `items` in the pending set of `txn`.
    ///
    /// `batch` selects the whole-batch addressing rule: on a multi-consumer
    /// queue a batch containing any item with an empty recipient list fails
    /// entirely with a configuration error, and nothing is buffered. The
    /// single-item path accepts an empty list.
    async fn enqueue(
        &self,
        txn: TxnId,
        queue: &str,
        items: Vec<PendingMessage>,
        batch: bool,
    ) -> Result<(), QueueError>;

    /// Returns up to `max_count` committed messages eligible for `filter`,
    /// honoring its navigation and wait policy. An empty result is the
    /// normal "nothing available" outcome, never an error.
    async fn dequeue(
        &self,
        txn: TxnId,
        queue: &str,
        filter: &ConsumerFilter,
        max_count: usize,
    ) -> Result<Vec<StoredMessage>, QueueError>;

    /// Atomically publishes every message buffered under `txn`.
    async fn commit(&self, txn: TxnId) -> Result<(), QueueError>;

    /// Drops any pending state held for `txn`. Called when a session is
    /// discarded without commit.
    fn discard(&self, txn: TxnId);

    /// Administrative: creates a durable queue. Provisioning belongs to an
    /// external administrator in production deployments.
    async fn provision(&self, spec: QueueSpec) -> Result<(), QueueError>;
}
