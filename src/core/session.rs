//! Explicit transaction context.
//!
//! Every enqueue and dequeue call takes a [`Session`]; commit is an explicit
//! operation on it, never inferred from call sequencing. Sessions belong to
//! one caller each and are independent of one another.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::core::engine::{QueueEngine, TxnId};
use crate::core::error::QueueError;

static NEXT_TXN: AtomicU64 = AtomicU64::new(1);

/// One caller's transaction context over a shared engine.
///
/// Messages enqueued through a session stay invisible to every dequeue call,
/// including the session's own, until [`commit`](Self::commit). Dropping a
/// session discards whatever is still pending.
#[derive(Debug)]
pub struct Session<E: QueueEngine> {
    txn: TxnId,
    engine: Arc<E>,
}

impl<E: QueueEngine> Session<E> {
    pub fn begin(engine: Arc<E>) -> Self {
        let txn = NEXT_TXN.fetch_add(1, Ordering::Relaxed);
        Self { txn, engine }
    }

    pub fn txn(&self) -> TxnId {
        self.txn
    }

    /// Publishes every pending message of this session atomically. The
    /// session stays usable; later enqueues start a fresh pending set under
    /// the same context.
    pub async fn commit(&self) -> Result<(), QueueError> {
        debug!(target: "addrmq::session", txn = self.txn, "commit");
        self.engine.commit(self.txn).await
    }
}

impl<E: QueueEngine> Drop for Session<E> {
    fn drop(&mut self) {
        self.engine.discard(self.txn);
    }
}
