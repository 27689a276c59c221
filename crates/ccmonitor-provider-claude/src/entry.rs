//! Raw Claude Code JSONL records
//!
//! One line of a Claude Code project log. Only assistant messages with a
//! usage block turn into usage events; everything else on the line is
//! ignored by serde.

use crate::pricing::estimate_cost;
use ccmonitor_core::types::{ModelName, TokenCounts, UsageEvent};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::trace;

/// Model name Claude Code writes for locally generated messages
const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Token usage reported by the API
#[derive(Debug, Clone, Deserialize)]
pub struct MessageUsage {
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

/// The API message an entry carries
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub model: String,
    pub usage: MessageUsage,
    /// Message ID, half of the dedup key
    #[serde(default)]
    pub id: Option<String>,
}

/// One JSONL line
#[derive(Debug, Clone, Deserialize)]
pub struct RawJsonlEntry {
    pub timestamp: String,
    pub message: Message,
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    #[serde(rename = "costUSD", default)]
    pub cost_usd_camel: Option<f64>,
    #[serde(rename = "cost_usd", default)]
    pub cost_usd: Option<f64>,
    #[serde(rename = "isApiErrorMessage", default)]
    pub is_api_error_message: Option<bool>,
}

impl RawJsonlEntry {
    /// Key identifying repeated writes of the same API response
    pub fn dedup_key(&self) -> Option<String> {
        match (&self.message.id, &self.request_id) {
            (Some(msg_id), Some(req_id)) => Some(format!("{msg_id}-{req_id}")),
            (Some(msg_id), None) => Some(msg_id.clone()),
            (None, Some(req_id)) => Some(req_id.clone()),
            (None, None) => None,
        }
    }

    /// Convert into a usage event, `None` for lines that do not count
    pub fn into_event(self) -> Option<UsageEvent> {
        if self.is_api_error_message.unwrap_or(false) {
            trace!("Skipping API error message");
            return None;
        }
        if self.entry_type.as_deref().is_some_and(|t| t != "assistant") {
            return None;
        }
        if self.message.model == SYNTHETIC_MODEL {
            return None;
        }

        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| trace!("Bad timestamp '{}': {}", self.timestamp, e))
            .ok()?;

        let usage = &self.message.usage;
        let tokens = TokenCounts::new(
            usage.input_tokens,
            usage.output_tokens,
            usage.cache_creation_input_tokens,
            usage.cache_read_input_tokens,
        );
        let model = ModelName::new(self.message.model);
        let cost = self
            .cost_usd_camel
            .or(self.cost_usd)
            .unwrap_or_else(|| estimate_cost(&tokens, &model));

        Some(UsageEvent::new(timestamp, model, tokens, cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> RawJsonlEntry {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_assistant_entry_converts() {
        let entry = parse(
            r#"{"timestamp":"2024-01-15T10:00:00.000Z","type":"assistant","requestId":"req_1","costUSD":0.25,"message":{"id":"msg_1","model":"claude-sonnet-4-20250514","usage":{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":10,"cache_read_input_tokens":5}}}"#,
        );
        assert_eq!(entry.dedup_key().as_deref(), Some("msg_1-req_1"));

        let event = entry.into_event().unwrap();
        assert_eq!(event.total_tokens(), 165);
        assert_eq!(event.cost, 0.25);
        assert_eq!(event.model.as_str(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_cost_falls_back_to_pricing() {
        let snake = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","cost_usd":0.5,"message":{"model":"claude-3-opus","usage":{"input_tokens":1}}}"#,
        );
        assert_eq!(snake.into_event().unwrap().cost, 0.5);

        let priced = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","message":{"model":"claude-opus-4-20250514","usage":{"input_tokens":1000000}}}"#,
        );
        assert!((priced.into_event().unwrap().cost - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_filtered_entries() {
        let user = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","type":"user","message":{"model":"claude-3-opus","usage":{"input_tokens":1}}}"#,
        );
        assert!(user.into_event().is_none());

        let synthetic = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","type":"assistant","message":{"model":"<synthetic>","usage":{"input_tokens":0}}}"#,
        );
        assert!(synthetic.into_event().is_none());

        let api_error = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","type":"assistant","isApiErrorMessage":true,"message":{"model":"claude-3-opus","usage":{"input_tokens":1}}}"#,
        );
        assert!(api_error.into_event().is_none());

        let bad_time = parse(
            r#"{"timestamp":"yesterday","type":"assistant","message":{"model":"claude-3-opus","usage":{"input_tokens":1}}}"#,
        );
        assert!(bad_time.into_event().is_none());
    }

    #[test]
    fn test_dedup_key_variants() {
        let only_request = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","requestId":"req_9","message":{"model":"m","usage":{"input_tokens":1}}}"#,
        );
        assert_eq!(only_request.dedup_key().as_deref(), Some("req_9"));

        let neither = parse(
            r#"{"timestamp":"2024-01-15T10:00:00Z","message":{"model":"m","usage":{"input_tokens":1}}}"#,
        );
        assert_eq!(neither.dedup_key(), None);
    }
}
