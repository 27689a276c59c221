//! Keeps fired notifications on screen for a minimum time
//!
//! The core reports a notification only on the cycle it fires. With a short
//! refresh interval that would flash it for a single frame, so both renderers
//! keep each one visible for [`NOTIFICATION_MIN_DURATION_SECS`] after it
//! fired. Moving to a new block clears the board.

use ccmonitor_core::{NotificationKind, ViewModel};
use chrono::{DateTime, Duration, Utc};
use tracing::trace;

/// Seconds a notification stays visible after it fired
pub const NOTIFICATION_MIN_DURATION_SECS: i64 = 5;

/// Notifications currently on screen with the instant each fired
#[derive(Debug, Clone, Default)]
pub struct NotificationBoard {
    block_start: Option<DateTime<Utc>>,
    shown: Vec<(NotificationKind, DateTime<Utc>)>,
}

impl NotificationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the cycle's fired kinds and return everything still visible
    pub fn update(&mut self, view: &ViewModel) -> Vec<NotificationKind> {
        let block_start = view.active_block.as_ref().map(|b| b.start_time());
        if block_start != self.block_start {
            trace!("Block changed, clearing {} notifications", self.shown.len());
            self.shown.clear();
            self.block_start = block_start;
        }

        for kind in &view.newly_fired_notifications {
            match self.shown.iter_mut().find(|(shown, _)| shown == kind) {
                Some(entry) => entry.1 = view.now,
                None => self.shown.push((*kind, view.now)),
            }
        }

        let min_duration = Duration::seconds(NOTIFICATION_MIN_DURATION_SECS);
        self.shown
            .retain(|(_, fired_at)| view.now - *fired_at < min_duration);
        self.shown.iter().map(|(kind, _)| *kind).collect()
    }
}
