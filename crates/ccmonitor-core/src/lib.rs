//! Core types and accounting engine for ccmonitor
//!
//! This crate groups raw usage events into 5-hour session blocks, resolves
//! the effective token limit for the configured plan, computes the burn rate
//! over a trailing lookback window and predicts whether the active block will
//! run out of tokens before it resets. Everything here is synchronous and
//! pure apart from the explicit [`engine::MonitorState`] passed into
//! [`engine::compute`].

pub mod blocks;
pub mod burn_rate;
pub mod engine;
pub mod error;
pub mod limits;
pub mod notifications;
pub mod plan;
pub mod provider;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use blocks::{SessionBlock, SessionBlocks};
pub use burn_rate::{BurnRateSample, DepletionTime, PredictionResult};
pub use engine::{Monitor, MonitorState, ViewModel, compute};
pub use error::{CcmonitorError, Result};
pub use limits::{LimitDetector, LimitResolution};
pub use notifications::{NotificationKind, NotificationState};
pub use plan::{Plan, PlanName};
pub use provider::UsageSource;
pub use timezone::TimezoneConfig;
pub use types::{ISOTimestamp, ModelName, TokenCounts, UsageEvent};
