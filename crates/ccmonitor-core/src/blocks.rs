//! Session block builder
//!
//! Claude allowances reset on rolling 5-hour windows. A window opens with the
//! first event after the previous window closed and lasts exactly five hours
//! from that event, regardless of later activity. This module folds a usage
//! history into those windows.
//!
//! Construction is append-only and forward-only: events are sorted once, each
//! one lands in the current block or opens a new one, and a block is never
//! touched again once a newer block exists. Every poll cycle rebuilds the
//! whole sequence from scratch.
//!
//! # Examples
//!
//! ```
//! use ccmonitor_core::blocks::SessionBlocks;
//! use ccmonitor_core::types::{ModelName, TokenCounts, UsageEvent};
//! use chrono::{TimeZone, Utc};
//!
//! let ten = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
//! let events = vec![UsageEvent::new(
//!     ten,
//!     ModelName::new("claude-sonnet-4-20250514"),
//!     TokenCounts::new(1000, 0, 0, 0),
//!     0.0,
//! )];
//!
//! let blocks = SessionBlocks::build(events, ten);
//! let active = blocks.active().unwrap();
//! assert_eq!(active.total_tokens(), 1000);
//! assert_eq!(active.end_time(), ten + chrono::Duration::hours(5));
//! ```

use crate::types::{ModelName, TokenCounts, UsageEvent};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

/// Length of a session block in hours
pub const SESSION_HOURS: i64 = 5;

/// Length of a session block
pub fn session_duration() -> Duration {
    Duration::hours(SESSION_HOURS)
}

/// One 5-hour allowance window
///
/// `end_time` is fixed at `start_time + 5h` when the block opens. Token and
/// cost aggregates are updated on every append.
#[derive(Debug, Clone, Serialize)]
pub struct SessionBlock {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<UsageEvent>,
    event_count: usize,
    tokens: TokenCounts,
    total_tokens: u64,
    total_cost: f64,
    models_used: Vec<ModelName>,
}

impl SessionBlock {
    /// Open a block with its first event
    fn open(event: UsageEvent) -> Self {
        let start_time = event.time();
        let mut block = Self {
            start_time,
            end_time: start_time + session_duration(),
            events: Vec::new(),
            event_count: 0,
            tokens: TokenCounts::default(),
            total_tokens: 0,
            total_cost: 0.0,
            models_used: Vec::new(),
        };
        block.append(event);
        block
    }

    fn append(&mut self, event: UsageEvent) {
        self.tokens += event.tokens;
        self.total_tokens = self.tokens.total();
        self.total_cost += event.cost;
        if !self.models_used.contains(&event.model) {
            self.models_used.push(event.model.clone());
        }
        self.events.push(event);
        self.event_count = self.events.len();
    }

    /// Timestamp of the event that opened the block
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Reset instant, `start_time + 5h`
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Events in timestamp order
    pub fn events(&self) -> &[UsageEvent] {
        &self.events
    }

    /// Per-kind token totals
    pub fn tokens(&self) -> TokenCounts {
        self.tokens
    }

    /// Sum of all token kinds over the block
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Cost in USD over the block
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Distinct models in first-seen order
    pub fn models_used(&self) -> &[ModelName] {
        &self.models_used
    }

    /// Whether `now` falls in `[start_time, end_time)`
    ///
    /// This is only the time half of the activity test; see
    /// [`SessionBlocks::active`].
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }

    /// Whether the block's range intersects `[from, to]`
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start_time <= to && self.end_time > from
    }
}

/// The ordered block sequence for one poll cycle
#[derive(Debug, Clone)]
pub struct SessionBlocks {
    blocks: Vec<SessionBlock>,
    now: DateTime<Utc>,
}

impl SessionBlocks {
    /// Partition `events` into session blocks as seen at `now`
    ///
    /// Events are sorted by timestamp first (stable, so equal timestamps keep
    /// their source order). An empty history yields no blocks and no active
    /// session.
    pub fn build<I>(events: I, now: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = UsageEvent>,
    {
        let mut events: Vec<UsageEvent> = events.into_iter().collect();
        events.sort_by_key(UsageEvent::time);

        let mut blocks: Vec<SessionBlock> = Vec::new();
        for event in events {
            match blocks.last_mut() {
                Some(current) if event.time() < current.end_time => current.append(event),
                _ => blocks.push(SessionBlock::open(event)),
            }
        }

        debug!("Built {} session blocks", blocks.len());
        Self { blocks, now }
    }

    /// All blocks ordered by `start_time`
    pub fn blocks(&self) -> &[SessionBlock] {
        &self.blocks
    }

    /// The instant activity is evaluated at
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The active block, if any
    ///
    /// Only the most recent block can be active, and only while `now` is
    /// inside its window. `None` is the "no active session" state.
    pub fn active(&self) -> Option<&SessionBlock> {
        self.blocks.last().filter(|b| b.is_active_at(self.now))
    }

    /// Every block except the active one
    pub fn completed(&self) -> impl Iterator<Item = &SessionBlock> {
        let take = if self.active().is_some() {
            self.blocks.len() - 1
        } else {
            self.blocks.len()
        };
        self.blocks.iter().take(take)
    }

    /// The most recent block, active or not
    pub fn last(&self) -> Option<&SessionBlock> {
        self.blocks.last()
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether there are no blocks at all
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, event};

    #[test]
    fn test_single_event_opens_active_block() {
        let blocks = SessionBlocks::build(vec![event(at(10, 0), 1000)], at(10, 0));

        assert_eq!(blocks.len(), 1);
        let active = blocks.active().expect("block should be active");
        assert_eq!(active.start_time(), at(10, 0));
        assert_eq!(active.end_time(), at(15, 0));
        assert_eq!(active.total_tokens(), 1000);
        assert_eq!(blocks.completed().count(), 0);
    }

    #[test]
    fn test_no_active_block_after_window_closes() {
        let blocks = SessionBlocks::build(vec![event(at(10, 0), 1000)], at(16, 0));

        assert_eq!(blocks.len(), 1);
        assert!(blocks.active().is_none());
        assert_eq!(blocks.completed().count(), 1);
    }

    #[test]
    fn test_block_is_inactive_exactly_at_end_time() {
        let blocks = SessionBlocks::build(vec![event(at(10, 0), 1000)], at(15, 0));
        assert!(blocks.active().is_none());
    }

    #[test]
    fn test_empty_history() {
        let blocks = SessionBlocks::build(Vec::new(), at(10, 0));
        assert!(blocks.is_empty());
        assert!(blocks.active().is_none());
        assert!(blocks.last().is_none());
        assert_eq!(blocks.completed().count(), 0);
    }

    #[test]
    fn test_event_at_end_time_opens_new_block() {
        let events = vec![
            event(at(10, 0), 100),
            event(at(14, 59), 200),
            event(at(15, 0), 300),
        ];
        let blocks = SessionBlocks::build(events, at(16, 0));

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.blocks()[0].total_tokens(), 300);
        assert_eq!(blocks.blocks()[1].start_time(), at(15, 0));
        assert_eq!(blocks.blocks()[1].end_time(), at(20, 0));
        assert_eq!(blocks.active().unwrap().total_tokens(), 300);
    }

    #[test]
    fn test_block_start_is_not_floored_to_hour() {
        let blocks = SessionBlocks::build(vec![event(at(10, 37), 10)], at(11, 0));
        let block = blocks.active().unwrap();
        assert_eq!(block.start_time(), at(10, 37));
        assert_eq!(block.end_time(), at(15, 37));
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_folding() {
        let events = vec![
            event(at(16, 0), 3),
            event(at(10, 0), 1),
            event(at(11, 0), 2),
        ];
        let blocks = SessionBlocks::build(events, at(17, 0));

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks.blocks()[0].total_tokens(), 3);
        assert_eq!(blocks.blocks()[0].events().last().map(|e| e.time()), Some(at(11, 0)));
        assert_eq!(blocks.blocks()[1].total_tokens(), 3);
        assert_eq!(blocks.blocks()[1].events().len(), 1);
    }

    #[test]
    fn test_future_block_is_not_active() {
        let blocks = SessionBlocks::build(vec![event(at(12, 0), 10)], at(11, 0));
        assert!(blocks.active().is_none());
    }

    #[test]
    fn test_aggregates_and_models() {
        let mut second = event(at(10, 30), 50);
        second.model = crate::types::ModelName::new("claude-opus-4-20250514");
        second.cost = 0.25;
        let mut first = event(at(10, 0), 100);
        first.cost = 0.5;

        let blocks = SessionBlocks::build(vec![first, second, event(at(11, 0), 25)], at(11, 0));
        let block = blocks.active().unwrap();

        assert_eq!(block.total_tokens(), 175);
        assert!((block.total_cost() - 0.75).abs() < f64::EPSILON);
        assert_eq!(block.models_used().len(), 2);
        assert_eq!(block.events().len(), 3);
    }

    #[test]
    fn test_overlaps() {
        let blocks = SessionBlocks::build(vec![event(at(10, 0), 1)], at(10, 0));
        let block = &blocks.blocks()[0];
        assert!(block.overlaps(at(9, 0), at(10, 0)));
        assert!(block.overlaps(at(14, 59), at(16, 0)));
        assert!(!block.overlaps(at(15, 0), at(16, 0)));
        assert!(!block.overlaps(at(8, 0), at(9, 59)));
    }
}
