//! Runtime tunables.
//!
//! Defaults match the host contract and need no file at all; plugins that
//! want different polling behaviour can ship a small TOML next to their
//! manifest and load it with [`RuntimeConfig::from_file`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Cadence of the refresh loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Consecutive failures of one context that trip the circuit breaker.
pub const MAX_POLL_FAILURES: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_poll_failures")]
    pub max_poll_failures: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_failures: default_max_poll_failures(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL.as_millis() as u64
}

fn default_max_poll_failures() -> u32 {
    MAX_POLL_FAILURES
}

impl RuntimeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
