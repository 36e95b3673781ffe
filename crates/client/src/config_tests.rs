// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Courier Contributors

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use super::*;
use yare::parameterized;

// delay(n) = base * 2^(n-1), verified across the full retry budget.
#[parameterized(
    first = { 1, 1000 },
    second = { 2, 2000 },
    third = { 3, 4000 },
    fourth = { 4, 8000 },
    fifth = { 5, 16000 },
)]
fn backoff_doubles_per_attempt(attempt: u32, expected_ms: u64) {
    let config = ClientConfig::default();
    assert_eq!(
        config.backoff_delay(attempt),
        Duration::from_millis(expected_ms)
    );
}

#[test]
fn backoff_is_capped_at_max_delay() {
    let config = ClientConfig {
        max_delay_secs: 5,
        ..ClientConfig::default()
    };
    assert_eq!(config.backoff_delay(10), Duration::from_secs(5));
    // Huge attempt numbers must not overflow.
    assert_eq!(config.backoff_delay(u32::MAX), Duration::from_secs(5));
}

#[test]
fn heartbeat_interval_can_be_disabled() {
    let config = ClientConfig::default();
    assert_eq!(config.heartbeat_interval(), Some(Duration::from_secs(30)));

    let config = ClientConfig {
        heartbeat_interval_secs: 0,
        ..config
    };
    assert!(config.heartbeat_interval().is_none());
}

#[test]
fn config_deserializes_with_defaults() {
    let config: ClientConfig = serde_json::from_str(r#"{"url":"wss://chat.example"}"#).unwrap();
    assert_eq!(config.url, "wss://chat.example");
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.base_delay_ms, 1000);
}
