//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of the background loops and external calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How often every status display is refreshed (seconds).
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,

    /// How often due drawings are resolved (seconds).
    #[serde(default = "default_drawing_interval")]
    pub drawing_interval_secs: u64,

    /// Upper bound for any single platform call (seconds).
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

fn default_status_interval() -> u64 {
    30
}

fn default_drawing_interval() -> u64 {
    30
}

fn default_call_timeout() -> u64 {
    10
}

impl EngineConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    pub fn drawing_interval(&self) -> Duration {
        Duration::from_secs(self.drawing_interval_secs)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: default_status_interval(),
            drawing_interval_secs: default_drawing_interval(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}
