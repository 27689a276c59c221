//! Core domain types for ccmonitor
//!
//! This module contains the fundamental types used throughout the ccmonitor
//! crates. These types provide strong typing for model names, timestamps,
//! token counts and the usage events fed into the accounting engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Strongly-typed model name wrapper
///
/// Model identifiers are opaque to the engine; they are only collected per
/// block for display.
///
/// # Examples
/// ```
/// use ccmonitor_core::types::ModelName;
///
/// let model = ModelName::new("claude-sonnet-4-20250514");
/// assert_eq!(model.as_str(), "claude-sonnet-4-20250514");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UTC timestamp wrapper
///
/// Sources normalize every timestamp to UTC before handing events to the
/// engine; display conversion happens in the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for ISOTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

/// Token counts for usage tracking
///
/// This struct tracks all types of tokens consumed during Claude API usage,
/// including input, output, and cache-related tokens.
///
/// # Examples
/// ```
/// use ccmonitor_core::types::TokenCounts;
///
/// let tokens = TokenCounts::new(100, 50, 10, 5);
/// assert_eq!(tokens.total(), 165);
///
/// // TokenCounts supports arithmetic operations, saturating at u64::MAX
/// let tokens2 = TokenCounts::new(50, 25, 5, 2);
/// let combined = tokens + tokens2;
/// assert_eq!(combined.input_tokens, 150);
/// ```
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenCounts {
    /// Input tokens used
    pub input_tokens: u64,
    /// Output tokens generated
    pub output_tokens: u64,
    /// Cache creation tokens
    pub cache_creation_tokens: u64,
    /// Cache read tokens
    pub cache_read_tokens: u64,
}

impl TokenCounts {
    /// Create new TokenCounts
    pub fn new(
        input_tokens: u64,
        output_tokens: u64,
        cache_creation_tokens: u64,
        cache_read_tokens: u64,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cache_creation_tokens,
            cache_read_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            input_tokens: self.input_tokens.saturating_add(other.input_tokens),
            output_tokens: self.output_tokens.saturating_add(other.output_tokens),
            cache_creation_tokens: self
                .cache_creation_tokens
                .saturating_add(other.cache_creation_tokens),
            cache_read_tokens: self.cache_read_tokens.saturating_add(other.cache_read_tokens),
        }
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// A single metered usage record
///
/// Events are immutable once produced by a usage source. They carry no
/// identity beyond their timestamp and content, and are ordered by
/// timestamp.
///
/// # Examples
/// ```
/// use ccmonitor_core::types::{ModelName, TokenCounts, UsageEvent};
/// use chrono::{TimeZone, Utc};
///
/// let event = UsageEvent::new(
///     Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
///     ModelName::new("claude-sonnet-4-20250514"),
///     TokenCounts::new(800, 200, 0, 0),
///     0.012,
/// );
/// assert_eq!(event.total_tokens(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// When the usage happened (UTC)
    pub timestamp: ISOTimestamp,
    /// Model that served the request
    pub model: ModelName,
    /// Token counts
    #[serde(flatten)]
    pub tokens: TokenCounts,
    /// Cost in USD
    pub cost: f64,
}

impl UsageEvent {
    /// Create a new usage event. Negative costs are clamped to zero.
    pub fn new(timestamp: DateTime<Utc>, model: ModelName, tokens: TokenCounts, cost: f64) -> Self {
        Self {
            timestamp: ISOTimestamp::new(timestamp),
            model,
            tokens,
            cost: if cost.is_finite() { cost.max(0.0) } else { 0.0 },
        }
    }

    /// The event's instant
    pub fn time(&self) -> DateTime<Utc> {
        *self.timestamp.inner()
    }

    /// Sum of all token kinds
    pub fn total_tokens(&self) -> u64 {
        self.tokens.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_model_name() {
        let model = ModelName::new("claude-3-opus");
        assert_eq!(model.as_str(), "claude-3-opus");
        assert_eq!(model.to_string(), "claude-3-opus");
    }

    #[test]
    fn test_token_counts_arithmetic() {
        let tokens1 = TokenCounts::new(100, 50, 10, 5);
        let tokens2 = TokenCounts::new(200, 100, 20, 10);

        let sum = tokens1 + tokens2;
        assert_eq!(sum.input_tokens, 300);
        assert_eq!(sum.output_tokens, 150);
        assert_eq!(sum.cache_creation_tokens, 30);
        assert_eq!(sum.cache_read_tokens, 15);
        assert_eq!(sum.total(), 495);
    }

    #[test]
    fn test_token_counts_saturate() {
        let big = TokenCounts::new(u64::MAX / 2 + 1, u64::MAX, 0, 1);
        let sum = big + big;
        assert_eq!(sum.input_tokens, u64::MAX);
        assert_eq!(sum.output_tokens, u64::MAX);
        assert_eq!(sum.cache_read_tokens, 2);
        assert_eq!(sum.total(), u64::MAX);

        let mut acc = TokenCounts::default();
        acc += big;
        acc += big;
        assert_eq!(acc, sum);
    }

    #[test]
    fn test_usage_event_clamps_cost() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let event = UsageEvent::new(ts, ModelName::new("m"), TokenCounts::default(), -1.0);
        assert_eq!(event.cost, 0.0);

        let event = UsageEvent::new(ts, ModelName::new("m"), TokenCounts::default(), f64::NAN);
        assert_eq!(event.cost, 0.0);
        assert_eq!(event.time(), ts);
    }

    #[test]
    fn test_usage_event_serializes_flat_tokens() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let event = UsageEvent::new(ts, ModelName::new("m"), TokenCounts::new(1, 2, 3, 4), 0.5);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["input_tokens"], 1);
        assert_eq!(json["cache_read_tokens"], 4);
        assert_eq!(json["cost"], 0.5);
    }
}
