//! Terminal rendering for ccmonitor
//!
//! This crate turns a [`ccmonitor_core::ViewModel`] into text: a boxed
//! full-screen panel and a single-line compact form with selectable fields.
//! Both keep fired notifications on screen for a minimum duration and color
//! their output for a light or dark terminal.

pub mod compact;
pub mod format;
pub mod monitor_display;
pub mod notices;
pub mod theme;

#[cfg(test)]
mod test_support;

pub use compact::{CompactField, CompactFields, CompactFormatter};
pub use monitor_display::MonitorDisplay;
pub use notices::{NOTIFICATION_MIN_DURATION_SECS, NotificationBoard};
pub use theme::Theme;
