//! Common test utilities and helpers for ccmonitor tests
//!
//! Builders for usage events and on-disk JSONL fixtures shared by the
//! integration tests.

#![allow(dead_code)]

use ccmonitor_core::{ModelName, TokenCounts, UsageEvent};
use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;

/// Common test models used across tests
pub const TEST_MODELS: &[&str] = &[
    "claude-opus-4-20250514",
    "claude-sonnet-4-20250514",
    "claude-3-5-haiku-20241022",
];

/// 2024-01-15 at the given UTC hour and minute
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
}

/// Builder for creating test UsageEvent instances
pub struct UsageEventBuilder {
    timestamp: DateTime<Utc>,
    model: String,
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_tokens: u64,
    cache_read_tokens: u64,
    cost: f64,
}

impl UsageEventBuilder {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            model: TEST_MODELS[1].to_string(),
            input_tokens: 0,
            output_tokens: 0,
            cache_creation_tokens: 0,
            cache_read_tokens: 0,
            cost: 0.0,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_tokens(mut self, input: u64, output: u64) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    pub fn with_cache_tokens(mut self, creation: u64, read: u64) -> Self {
        self.cache_creation_tokens = creation;
        self.cache_read_tokens = read;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn build(self) -> UsageEvent {
        UsageEvent::new(
            self.timestamp,
            ModelName::new(self.model),
            TokenCounts::new(
                self.input_tokens,
                self.output_tokens,
                self.cache_creation_tokens,
                self.cache_read_tokens,
            ),
            self.cost,
        )
    }
}

/// An event carrying `tokens` input tokens
pub fn event(timestamp: DateTime<Utc>, tokens: u64) -> UsageEvent {
    UsageEventBuilder::new(timestamp)
        .with_tokens(tokens, 0)
        .build()
}

/// A JSONL assistant line as Claude Code writes it
pub fn assistant_line(timestamp: DateTime<Utc>, msg_id: &str, input: u64, output: u64) -> String {
    format!(
        r#"{{"timestamp":"{}","type":"assistant","requestId":"req_{msg_id}","message":{{"id":"{msg_id}","model":"{}","usage":{{"input_tokens":{input},"output_tokens":{output}}}}}}}"#,
        timestamp.to_rfc3339(),
        TEST_MODELS[1],
    )
}

/// Write `lines` as a JSONL file, creating parent directories
pub fn write_jsonl(path: &Path, lines: &[String]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, lines.join("\n")).unwrap();
}
