use std::fmt;

/// Error taxonomy for queue operations.
///
/// `InvalidArgument` and `SchemaViolation` are detected locally before any
/// engine interaction; the remaining variants surface engine outcomes
/// verbatim. The core never retries: transient failures belong to the
/// caller's retry policy.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueError {
    /// Malformed caller input (recipient list entries, filter spellings).
    /// `position` identifies the offending list element where applicable.
    InvalidArgument {
        position: Option<usize>,
        reason: String,
    },
    /// Payload or handle does not match the bound schema descriptor.
    SchemaViolation(String),
    /// Queue or schema name does not resolve.
    NotFound(String),
    /// Engine-side configuration rule violated (e.g. unaddressed batch on a
    /// multi-consumer queue).
    Configuration(String),
    /// Transient engine failure, surfaced unchanged.
    Engine(String),
}

impl std::error::Error for QueueError {}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::InvalidArgument {
                position: Some(pos),
                reason,
            } => write!(f, "invalid argument at position {pos}: {reason}"),
            QueueError::InvalidArgument {
                position: None,
                reason,
            } => write!(f, "invalid argument: {reason}"),
            QueueError::SchemaViolation(msg) => write!(f, "schema violation: {msg}"),
            QueueError::NotFound(what) => write!(f, "not found: {what}"),
            QueueError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            QueueError::Engine(msg) => write!(f, "engine error: {msg}"),
        }
    }
}
