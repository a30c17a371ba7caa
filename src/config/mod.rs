use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QueuesConfig {
    /// Default bound for `block:<ms>` waits when the caller gives none.
    pub default_wait_ms: u64,
    /// Default `max_count` for batch dequeues.
    pub default_deq_batch: usize,
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            default_wait_ms: 5_000,
            default_deq_batch: 16,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback tracing filter when RUST_LOG is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub queues: QueuesConfig,
    pub logging: LoggingConfig,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, anyhow::Error> {
    let raw: String = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&raw)?;
    Ok(config)
}

/// Global configuration: `addrmq.toml` in the working directory when
/// present, built-in defaults otherwise.
pub static CONFIG: Lazy<Config> =
    Lazy::new(|| load_config("addrmq.toml").unwrap_or_default());
