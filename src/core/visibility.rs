//! Shared addressing and visibility rules.
//!
//! Consulted by the dequeue path for eligibility and enforced by the
//! enqueue path at submission time. Keeping both sides on one predicate is
//! what makes the addressing contract symmetric.

use crate::core::engine::ConsumerMode;
use crate::core::error::QueueError;
use crate::core::message::ConsumerName;
use crate::core::schema::Value;

/// Validates a recipient list before any engine interaction.
///
/// Every element must be non-empty text; the first offending element fails
/// the whole call with its position. An empty list is syntactically valid
/// and forwarded to the engine, whose queue mode decides the outcome.
pub fn validate_recipients(recipients: &[Value]) -> Result<Vec<ConsumerName>, QueueError> {
    let mut names = Vec::with_capacity(recipients.len());
    for (position, value) in recipients.iter().enumerate() {
        match value.as_text() {
            Some(name) if !name.is_empty() => names.push(ConsumerName::from(name)),
            _ => {
                return Err(QueueError::InvalidArgument {
                    position: Some(position),
                    reason: format!(
                        "recipient must be a non-empty string, got {}",
                        value.kind()
                    ),
                })
            }
        }
    }
    Ok(names)
}

/// Whether a message with `recipients` is visible to `consumer`.
///
/// Single-consumer queues ignore addressing entirely. On multi-consumer
/// queues an empty recipient list falls back to the queue's default
/// subscriber list; a queue without defaults makes such a message
/// non-deliverable under any filter.
pub fn is_eligible(
    mode: ConsumerMode,
    recipients: &[ConsumerName],
    default_subscribers: &[ConsumerName],
    consumer: &ConsumerName,
) -> bool {
    match mode {
        ConsumerMode::Single => true,
        ConsumerMode::Multi => {
            if recipients.is_empty() {
                default_subscribers.contains(consumer)
            } else {
                recipients.contains(consumer)
            }
        }
    }
}
