//! Once-per-block notification tracking
//!
//! Each notification kind fires at most once while the same block is active.
//! The fired set is bound to the active block's identity (its start time) and
//! is cleared whenever that identity changes, including a change to no active
//! block at all.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Kinds of alerts the monitor raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The configured plan was switched to `custom_max`
    LimitExceeded,
    /// `custom_max` had no completed history and used the Pro limit
    PlanFallback,
    /// Tokens will run out before the block resets
    DepletionWarning,
    /// The active block is already above the effective limit
    TokensExceeded,
}

impl NotificationKind {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LimitExceeded => "limit_exceeded",
            Self::PlanFallback => "plan_fallback",
            Self::DepletionWarning => "depletion_warning",
            Self::TokensExceeded => "tokens_exceeded",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fired notifications for the current active block
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    block_start: Option<DateTime<Utc>>,
    fired: BTreeSet<NotificationKind>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the state to the active block, clearing it on identity change
    pub fn observe_block(&mut self, block_start: Option<DateTime<Utc>>) {
        if self.block_start != block_start {
            self.fired.clear();
            self.block_start = block_start;
        }
    }

    /// Returns true only the first time `condition` holds in this block
    pub fn evaluate(&mut self, kind: NotificationKind, condition: bool) -> bool {
        condition && self.fired.insert(kind)
    }

    pub fn has_fired(&self, kind: NotificationKind) -> bool {
        self.fired.contains(&kind)
    }

    /// Kinds fired in the current block
    pub fn fired(&self) -> impl Iterator<Item = NotificationKind> + '_ {
        self.fired.iter().copied()
    }

    /// Identity of the block the state is bound to
    pub fn block_start(&self) -> Option<DateTime<Utc>> {
        self.block_start
    }

    pub fn reset(&mut self) {
        self.block_start = None;
        self.fired.clear();
    }
}
