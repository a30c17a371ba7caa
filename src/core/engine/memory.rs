//! Transactional in-memory queue engine.
//!
//! Reference implementation of the [`QueueEngine`] seam:
//! - per-transaction pending buffers, published atomically on commit
//! - sequence-ordered eligibility scans with per-consumer consumption marks
//! - retirement once every addressed consumer has consumed a message
//! - commit-epoch wakeups for `Block(timeout)` dequeues

use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, trace};

use bytes::Bytes;

use crate::core::engine::{
    ConsumerMode, PendingMessage, QueueEngine, QueueSpec, StoredMessage, TxnId,
};
use crate::core::error::QueueError;
use crate::core::filter::{ConsumerFilter, WaitMode};
use crate::core::lob::LobStore;
use crate::core::message::{current_timestamp, ConsumerName, MessageId};
use crate::core::visibility::is_eligible;

#[derive(Debug)]
struct Slot {
    id: MessageId,
    wire: Bytes,
    recipients: Vec<ConsumerName>,
    enqueued_at: u64,
    consumed_by: HashSet<ConsumerName>,
}

#[derive(Debug, Default)]
struct QueueInner {
    /// Committed messages in enqueue order. Retired slots are removed.
    slots: Vec<Slot>,
}

#[derive(Debug)]
struct QueueState {
    spec: QueueSpec,
    inner: Mutex<QueueInner>,
    /// Bumped on every commit that touches this queue; blocked dequeues
    /// subscribe before scanning so no wakeup is missed.
    commits: watch::Sender<u64>,
}

#[derive(Debug)]
struct PendingEnqueue {
    queue: String,
    message: PendingMessage,
}

/// In-memory [`QueueEngine`] with transactional visibility.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    queues: DashMap<String, Arc<QueueState>>,
    pending: DashMap<TxnId, Vec<PendingEnqueue>>,
    lobs: LobStore,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Large-object capability co-located with the engine.
    pub fn lobs(&self) -> &LobStore {
        &self.lobs
    }

    fn state(&self, queue: &str) -> Result<Arc<QueueState>, QueueError> {
        self.queues
            .get(queue)
            .map(|entry| Arc::clone(&*entry))
            .ok_or_else(|| QueueError::NotFound(format!("queue '{queue}'")))
    }
}

impl QueueEngine for MemoryEngine {
    async fn lookup_queue(&self, name: &str) -> Result<QueueSpec, QueueError> {
        Ok(self.state(name)?.spec.clone())
    }

    async fn enqueue(
        &self,
        txn: TxnId,
        queue: &str,
        items: Vec<PendingMessage>,
        batch: bool,
    ) -> Result<(), QueueError> {
        let state = self.state(queue)?;
        if batch
            && state.spec.mode == ConsumerMode::Multi
            && items.iter().any(|item| item.recipients.is_empty())
        {
            // Whole-batch rule: nothing is buffered.
            return Err(QueueError::Configuration(format!(
                "batch enqueue on multi-consumer queue '{queue}' requires a recipient list on every message"
            )));
        }

        let count = items.len();
        self.pending.entry(txn).or_default().extend(
            items.into_iter().map(|message| PendingEnqueue {
                queue: queue.to_owned(),
                message,
            }),
        );
        debug!(target: "addrmq::engine", txn, queue, count, "buffered pending messages");
        Ok(())
    }

    async fn dequeue(
        &self,
        txn: TxnId,
        queue: &str,
        filter: &ConsumerFilter,
        max_count: usize,
    ) -> Result<Vec<StoredMessage>, QueueError> {
        let state = self.state(queue)?;
        let deadline = match filter.wait {
            WaitMode::NoWait => None,
            WaitMode::Block(bound) => Some(tokio::time::Instant::now() + bound),
        };
        // Subscribe before the first scan so a commit landing in between
        // still wakes us.
        let mut commits = state.commits.subscribe();

        loop {
            let taken = {
                let mut inner = state.inner.lock().await;
                collect(&state.spec, &mut inner, filter, max_count)
            };
            if !taken.is_empty() {
                trace!(
                    target: "addrmq::engine",
                    txn,
                    queue,
                    consumer = %filter.consumer,
                    count = taken.len(),
                    "dequeued"
                );
                return Ok(taken);
            }
            let Some(deadline) = deadline else {
                return Ok(Vec::new());
            };
            tokio::select! {
                changed = commits.changed() => {
                    if changed.is_err() {
                        return Ok(Vec::new());
                    }
                }
                _ = tokio::time::sleep_until(deadline) => return Ok(Vec::new()),
            }
        }
    }

    async fn commit(&self, txn: TxnId) -> Result<(), QueueError> {
        let Some((_, ops)) = self.pending.remove(&txn) else {
            trace!(target: "addrmq::engine", txn, "commit with no pending messages");
            return Ok(());
        };

        // Group consecutive runs per queue so each run becomes visible under
        // a single lock, in enqueue order.
        let mut grouped: Vec<(String, Vec<PendingMessage>)> = Vec::new();
        for op in ops {
            match grouped.last_mut() {
                Some((name, run)) if *name == op.queue => run.push(op.message),
                _ => grouped.push((op.queue, vec![op.message])),
            }
        }

        let mut touched: Vec<Arc<QueueState>> = Vec::new();
        for (queue, run) in grouped {
            let state = self.state(&queue)?;
            let mut inner = state.inner.lock().await;
            for message in run {
                inner.slots.push(Slot {
                    id: MessageId::fresh(),
                    wire: message.wire,
                    recipients: message.recipients,
                    enqueued_at: current_timestamp(),
                    consumed_by: HashSet::new(),
                });
            }
            drop(inner);
            if !touched.iter().any(|s| Arc::ptr_eq(s, &state)) {
                touched.push(state);
            }
        }
        for state in &touched {
            state.commits.send_modify(|epoch| *epoch += 1);
        }
        debug!(target: "addrmq::engine", txn, queues = touched.len(), "committed");
        Ok(())
    }

    fn discard(&self, txn: TxnId) {
        if self.pending.remove(&txn).is_some() {
            trace!(target: "addrmq::engine", txn, "discarded uncommitted messages");
        }
    }

    async fn provision(&self, spec: QueueSpec) -> Result<(), QueueError> {
        use dashmap::mapref::entry::Entry;
        match self.queues.entry(spec.name.clone()) {
            Entry::Occupied(_) => Err(QueueError::Configuration(format!(
                "queue '{}' is already provisioned",
                spec.name
            ))),
            Entry::Vacant(vacant) => {
                debug!(target: "addrmq::engine", queue = %spec.name, "provisioned queue");
                let (commits, _) = watch::channel(0u64);
                vacant.insert(Arc::new(QueueState {
                    spec,
                    inner: Mutex::new(QueueInner::default()),
                    commits,
                }));
                Ok(())
            }
        }
    }
}

/// Scans committed messages in enqueue order, marking each taken message as
/// consumed by the filtering consumer and retiring slots every addressed
/// consumer has seen.
///
/// Consumed messages are skipped, so `NextMessage` and `FirstMessage`
/// navigation coincide here; the policy is carried through for engines with
/// real cursors.
fn collect(
    spec: &QueueSpec,
    inner: &mut QueueInner,
    filter: &ConsumerFilter,
    max_count: usize,
) -> Vec<StoredMessage> {
    let mut taken = Vec::new();
    for slot in inner.slots.iter_mut() {
        if taken.len() == max_count {
            break;
        }
        if slot.consumed_by.contains(&filter.consumer) {
            continue;
        }
        if !is_eligible(
            spec.mode,
            &slot.recipients,
            &spec.default_subscribers,
            &filter.consumer,
        ) {
            continue;
        }
        slot.consumed_by.insert(filter.consumer.clone());
        taken.push(StoredMessage {
            id: slot.id,
            wire: slot.wire.clone(),
            recipients: slot.recipients.clone(),
            enqueued_at: slot.enqueued_at,
        });
    }
    if !taken.is_empty() {
        inner.slots.retain(|slot| !retired(spec, slot));
    }
    taken
}

fn retired(spec: &QueueSpec, slot: &Slot) -> bool {
    match spec.mode {
        ConsumerMode::Single => !slot.consumed_by.is_empty(),
        ConsumerMode::Multi => {
            let audience = if slot.recipients.is_empty() {
                &spec.default_subscribers
            } else {
                &slot.recipients
            };
            !audience.is_empty() && audience.iter().all(|c| slot.consumed_by.contains(c))
        }
    }
}
