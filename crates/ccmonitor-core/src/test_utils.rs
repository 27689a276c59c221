//! Shared test utilities for unit tests
//!
//! Integration tests (in tests/) cannot access this module because it's
//! marked with #[cfg(test)]; they have their own helpers in
//! tests/common/mod.rs.

use crate::types::{ModelName, TokenCounts, UsageEvent};
use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::env;

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// 2024-01-15 at the given UTC hour and minute
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
}

/// An event carrying `tokens` input tokens
pub fn event(timestamp: DateTime<Utc>, tokens: u64) -> UsageEvent {
    UsageEvent::new(
        timestamp,
        ModelName::new("claude-sonnet-4-20250514"),
        TokenCounts::new(tokens, 0, 0, 0),
        0.0,
    )
}

/// RAII guard for environment variable manipulation in tests
///
/// Restores every touched variable on drop, even if the test panics.
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    /// Create a new environment variable guard
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set an environment variable and save its original value for restoration
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // Note: env::set_var is unsafe in Rust 1.82+ due to thread-safety concerns
        unsafe {
            env::set_var(key, value);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}
