//! Bound queue handle: the enqueue and dequeue engines.
//!
//! A [`QueueHandle`] is a lightweight reference binding one durable queue,
//! one payload codec and the shared storage engine. Handles hold no message
//! state; everything durable lives behind the engine seam.

use std::sync::Arc;
use tracing::debug;

use crate::core::codec::PayloadCodec;
use crate::core::engine::{PendingMessage, QueueEngine, QueueSpec};
use crate::core::error::QueueError;
use crate::core::filter::ConsumerFilter;
use crate::core::message::Message;
use crate::core::schema::{Record, Value};
use crate::core::session::Session;
use crate::core::visibility::validate_recipients;

#[derive(Debug)]
pub struct QueueHandle<E: QueueEngine> {
    spec: QueueSpec,
    codec: PayloadCodec,
    engine: Arc<E>,
}

impl<E: QueueEngine> QueueHandle<E> {
    pub(crate) fn new(spec: QueueSpec, codec: PayloadCodec, engine: Arc<E>) -> Self {
        Self {
            spec,
            codec,
            engine,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &QueueSpec {
        &self.spec
    }

    pub fn codec(&self) -> &PayloadCodec {
        &self.codec
    }

    /// Submits a single message addressed to `recipients`.
    ///
    /// Recipients are validated locally before any engine interaction: each
    /// element must be non-empty text, and the first offending element fails
    /// the call with its position. An empty list is forwarded; on a
    /// multi-consumer queue the message then routes to the queue's default
    /// subscribers, or becomes silently non-deliverable if it has none.
    ///
    /// The message stays pending in `session`'s transaction and is invisible
    /// to consumers until commit.
    pub async fn enqueue_one(
        &self,
        session: &Session<E>,
        payload: &Record,
        recipients: &[Value],
    ) -> Result<(), QueueError> {
        let recipients = validate_recipients(recipients)?;
        let wire = self.codec.encode(payload)?;
        self.engine
            .enqueue(
                session.txn(),
                &self.spec.name,
                vec![PendingMessage { wire, recipients }],
                false,
            )
            .await
    }

    /// Submits all `items` as one batch.
    ///
    /// Validation and encoding happen up front, so a bad item fails the call
    /// before anything reaches the engine. The batch itself is all-or-
    /// nothing: on a multi-consumer queue any item with an empty recipient
    /// list fails the whole call with a configuration error and zero items
    /// are buffered.
    pub async fn enqueue_many(
        &self,
        session: &Session<E>,
        items: &[(Record, Vec<Value>)],
    ) -> Result<(), QueueError> {
        let mut pending = Vec::with_capacity(items.len());
        for (payload, recipients) in items {
            let recipients = validate_recipients(recipients)?;
            let wire = self.codec.encode(payload)?;
            pending.push(PendingMessage { wire, recipients });
        }
        debug!(
            target: "addrmq::queue",
            queue = %self.spec.name,
            count = pending.len(),
            "submitting batch"
        );
        self.engine
            .enqueue(session.txn(), &self.spec.name, pending, true)
            .await
    }

    /// Returns the next message eligible for `filter`, or `None`.
    ///
    /// Under `NoWait` an empty outcome is immediate; under `Block(timeout)`
    /// the calling task suspends until a message becomes eligible or the
    /// bound elapses. "Nothing available" is never an error, whatever the
    /// cause: unknown consumer, true emptiness, or timeout.
    pub async fn dequeue_one(
        &self,
        session: &Session<E>,
        filter: &ConsumerFilter,
    ) -> Result<Option<Message>, QueueError> {
        Ok(self.dequeue_many(session, filter, 1).await?.pop())
    }

    /// Returns up to `max_count` eligible messages in enqueue order.
    ///
    /// Never pads the result and never errors on fewer-than-requested. With
    /// `Block(timeout)` the wait applies only until the first message is
    /// available; whatever else is immediately eligible is drained with it.
    pub async fn dequeue_many(
        &self,
        session: &Session<E>,
        filter: &ConsumerFilter,
        max_count: usize,
    ) -> Result<Vec<Message>, QueueError> {
        if max_count == 0 {
            return Ok(Vec::new());
        }
        let stored = self
            .engine
            .dequeue(session.txn(), &self.spec.name, filter, max_count)
            .await?;
        let mut messages = Vec::with_capacity(stored.len());
        for item in stored {
            messages.push(Message {
                id: item.id,
                payload: self.codec.decode(&item.wire)?,
                recipients: item.recipients,
                enqueued_at: item.enqueued_at,
            });
        }
        Ok(messages)
    }
}
