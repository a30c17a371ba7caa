use std::fmt;
use std::ops::Deref;
use uuid::Uuid;

use crate::core::schema::Record;

/// Durable identifier assigned by the storage engine at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name of a consumer a message may be addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsumerName(pub String);

impl fmt::Display for ConsumerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsumerName {
    fn from(s: &str) -> Self {
        ConsumerName(s.to_owned())
    }
}

impl From<String> for ConsumerName {
    fn from(s: String) -> Self {
        ConsumerName(s)
    }
}

impl From<ConsumerName> for String {
    fn from(name: ConsumerName) -> Self {
        name.0
    }
}

impl AsRef<str> for ConsumerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ConsumerName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A dequeued message.
///
/// Payload and recipient set are immutable once enqueued; only the engine's
/// visibility state changes over a message's lifetime.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub payload: Record,
    /// Addressing set recorded at enqueue time. Empty means the queue's
    /// default subscriber list.
    pub recipients: Vec<ConsumerName>,
    /// Engine-assigned enqueue timestamp, milliseconds since the Unix epoch.
    pub enqueued_at: u64,
}

/// Milliseconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
