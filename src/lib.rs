//! addrmq – a recipient-addressed, multi-consumer message queue core.
//!
//! This crate exports
//!  * `core`   – schema, codec, queue, session and engine logic
//!  * `config` – TOML-driven runtime configuration
//!  * `logging`– tracing bootstrap
//!
//! Producers enqueue typed records addressed to zero, one or many named
//! consumers; consumers retrieve only the messages addressed to them, with
//! transactional visibility and batch operations. All durable state lives
//! behind the [`core::engine::QueueEngine`] seam; the crate ships a
//! transactional in-memory engine for embedding and testing.

// ───────────────────────────────────────────────────────────
// Public modules
// ───────────────────────────────────────────────────────────
pub mod config;
pub mod core;
pub mod logging;

// ───────────────────────────────────────────────────────────
// Re-exports
// ───────────────────────────────────────────────────────────
pub use crate::config::{load_config, Config, CONFIG};
pub use crate::core::codec::PayloadCodec;
pub use crate::core::engine::{ConsumerMode, MemoryEngine, QueueEngine, QueueSpec};
pub use crate::core::error::QueueError;
pub use crate::core::filter::{ConsumerFilter, Navigation, WaitMode};
pub use crate::core::message::{ConsumerName, Message, MessageId};
pub use crate::core::queue::QueueHandle;
pub use crate::core::registry::QueueRegistry;
pub use crate::core::schema::{FieldDef, FieldType, Record, SchemaDescriptor, Value};
pub use crate::core::session::Session;
