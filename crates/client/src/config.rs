// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

//! Client configuration.
//!
//! The endpoint URL is environment-provided by the host application; the
//! remaining knobs have defaults matching the deployed chat servers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`ChatClient`](crate::ChatClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket endpoint, `ws://...` or `wss://...`.
    pub url: String,
    /// Reconnect attempts before giving up (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff in milliseconds (default: 1000).
    /// Attempt `n` waits `base_delay_ms * 2^(n-1)`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on the backoff delay in seconds (default: 30).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Heartbeat ping interval in seconds (default: 30). 0 = disabled.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_heartbeat_interval_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Configuration for the given endpoint with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        ClientConfig {
            url: url.into(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }

    /// Backoff delay before reconnect attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63);
        let delay_ms = self
            .base_delay_ms
            .saturating_mul(1u64.checked_shl(exp).unwrap_or(u64::MAX))
            .min(self.max_delay_secs.saturating_mul(1000));
        Duration::from_millis(delay_ms)
    }

    /// Heartbeat interval, or `None` when disabled.
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        if self.heartbeat_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.heartbeat_interval_secs))
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new("ws://localhost:8090/chat")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
