//! ccmonitor - Live monitor for Claude Code token usage
//!
//! This library provides functionality to:
//! - Load usage events from local Claude Code JSONL logs
//! - Group them into 5-hour session blocks
//! - Resolve the token limit for the configured plan, switching to a
//!   history-derived limit when the plan is outgrown
//! - Compute the burn rate and predict depletion before the block resets
//! - Render the result as a full-screen panel or a single compact line
//!
//! # Examples
//!
//! ```no_run
//! use ccmonitor::{
//!     live_monitor::{LiveMonitor, Renderer},
//!     Plan, TimezoneConfig,
//! };
//! use ccmonitor_provider_claude::DataLoader;
//! use ccmonitor_terminal::CompactFormatter;
//!
//! #[tokio::main]
//! async fn main() -> ccmonitor::Result<()> {
//!     let source = DataLoader::new().await?;
//!     let renderer = Renderer::Compact(CompactFormatter::new(TimezoneConfig::utc()));
//!     let monitor = LiveMonitor::new(source, Plan::pro(), renderer, 3);
//!
//!     println!("{}", monitor.run_once(false).await?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod live_monitor;

// Re-export commonly used types
pub use ccmonitor_core::{
    CcmonitorError, Monitor, NotificationKind, Plan, PlanName, Result, TimezoneConfig, UsageEvent,
    UsageSource, ViewModel,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
