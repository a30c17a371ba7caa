//! Dequeue retrieval policy.
//!
//! A [`ConsumerFilter`] is attached to a single dequeue invocation and never
//! persisted. Navigation and wait policies parse from their textual
//! spellings (the CLI surface) and reject malformed input before any engine
//! interaction.

use std::str::FromStr;
use std::time::Duration;

use crate::core::error::QueueError;
use crate::core::message::ConsumerName;

/// Ordering policy used to pick the next eligible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Navigation {
    /// Continue in enqueue order (default).
    #[default]
    NextMessage,
    /// Restart the scan from the queue head. Engine-level concept, passed
    /// through rather than reordered locally.
    FirstMessage,
}

impl FromStr for Navigation {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" | "next_message" => Ok(Navigation::NextMessage),
            "first" | "first_message" => Ok(Navigation::FirstMessage),
            other => Err(QueueError::InvalidArgument {
                position: None,
                reason: format!("unknown navigation '{other}'"),
            }),
        }
    }
}

/// Wait policy for a dequeue call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Return immediately when nothing is eligible (default).
    #[default]
    NoWait,
    /// Suspend the calling task until a message becomes eligible or the
    /// bound elapses. A timed-out wait yields the plain empty outcome.
    Block(Duration),
}

impl FromStr for WaitMode {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "no_wait" {
            return Ok(WaitMode::NoWait);
        }
        if let Some(ms) = s.strip_prefix("block:") {
            let ms: u64 = ms.parse().map_err(|_| QueueError::InvalidArgument {
                position: None,
                reason: format!("wait bound must be milliseconds, got '{ms}'"),
            })?;
            return Ok(WaitMode::Block(Duration::from_millis(ms)));
        }
        Err(QueueError::InvalidArgument {
            position: None,
            reason: format!("unknown wait mode '{s}' (expected 'no_wait' or 'block:<ms>')"),
        })
    }
}

/// Consumer identity plus retrieval policy for one dequeue invocation.
#[derive(Debug, Clone)]
pub struct ConsumerFilter {
    pub consumer: ConsumerName,
    pub navigation: Navigation,
    pub wait: WaitMode,
}

impl ConsumerFilter {
    /// Filter for `name` with default navigation and no waiting.
    pub fn for_consumer(name: impl Into<ConsumerName>) -> Self {
        Self {
            consumer: name.into(),
            navigation: Navigation::default(),
            wait: WaitMode::default(),
        }
    }

    pub fn navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn wait(mut self, wait: WaitMode) -> Self {
        self.wait = wait;
        self
    }
}
