//! Pipeline settings types.
//!
//! Each section carries its own `Default`, so a partial configuration
//! deserializes cleanly with `#[serde(default)]`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level pipeline settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Mailbox fetch defaults.
    #[serde(default)]
    pub fetch: FetchSettings,
    /// Network failure-handling knobs.
    #[serde(default)]
    pub network: NetworkSettings,
}

/// Mailbox fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// How many messages a fetch requests when the caller does not say.
    pub default_limit: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

/// Failure-handling floor for network calls: a caller-configurable timeout
/// and a single bounded retry with fixed backoff. No unbounded retry loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Backoff before the single retry, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_backoff_ms: 500,
        }
    }
}

impl NetworkSettings {
    /// The per-call timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The retry backoff as a [`Duration`].
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}
