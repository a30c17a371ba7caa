//! Large-object storage capability.
//!
//! Payload fields of type [`FieldType::Lob`](crate::core::schema::FieldType)
//! carry only an opaque [`LobRef`]; the bytes themselves live in a
//! [`LobStore`] and are moved through a scoped [`LobStream`] handle.
//! The handle is released when dropped, even on early return.

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::error::QueueError;

/// Opaque reference to a stored large object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LobRef(u64);

impl LobRef {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(&self) -> u64 {
        self.0
    }
}

/// In-memory large-object store with open-handle bookkeeping.
#[derive(Debug, Default)]
pub struct LobStore {
    next_id: AtomicU64,
    blobs: DashMap<u64, Bytes>,
    open: DashMap<u64, ()>,
}

impl LobStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            blobs: DashMap::new(),
            open: DashMap::new(),
        }
    }

    /// Allocates a new empty large object.
    pub fn create(&self) -> LobRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.blobs.insert(id, Bytes::new());
        LobRef(id)
    }

    /// Opens a scoped stream over an existing large object.
    pub fn open(&self, lob: LobRef) -> Result<LobStream<'_>, QueueError> {
        if !self.blobs.contains_key(&lob.0) {
            return Err(QueueError::NotFound(format!("large object #{}", lob.0)));
        }
        self.open.insert(lob.0, ());
        let existing = self
            .blobs
            .get(&lob.0)
            .map(|b| BytesMut::from(b.as_ref()))
            .unwrap_or_default();
        Ok(LobStream {
            store: self,
            id: lob.0,
            cursor: 0,
            buf: existing,
            dirty: false,
        })
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.open.len()
    }

    fn release(&self, id: u64, buf: &BytesMut, dirty: bool) {
        if dirty {
            self.blobs.insert(id, Bytes::copy_from_slice(buf));
        }
        self.open.remove(&id);
    }
}

/// Scoped read/write handle over one large object.
///
/// Writes are flushed back to the store on drop.
#[derive(Debug)]
pub struct LobStream<'a> {
    store: &'a LobStore,
    id: u64,
    cursor: usize,
    buf: BytesMut,
    dirty: bool,
}

impl LobStream<'_> {
    /// Appends a chunk to the object.
    pub fn write_chunk(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        self.dirty = true;
    }

    /// Reads the next chunk of at most `max` bytes, or `None` at end of
    /// stream.
    pub fn read_chunk(&mut self, max: usize) -> Option<Bytes> {
        if self.cursor >= self.buf.len() || max == 0 {
            return None;
        }
        let end = (self.cursor + max).min(self.buf.len());
        let chunk = Bytes::copy_from_slice(&self.buf[self.cursor..end]);
        self.cursor = end;
        Some(chunk)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Drop for LobStream<'_> {
    fn drop(&mut self) {
        self.store.release(self.id, &self.buf, self.dirty);
    }
}
