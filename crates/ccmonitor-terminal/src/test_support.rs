//! Fixtures for renderer tests

use ccmonitor_core::types::{ModelName, TokenCounts, UsageEvent};
use ccmonitor_core::{Monitor, MonitorState, Plan, ViewModel, compute};
use chrono::{DateTime, TimeZone, Utc};

/// 2024-01-15 at the given UTC hour and minute
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, 0).unwrap()
}

fn usage_events(events: Vec<(DateTime<Utc>, u64)>) -> Vec<UsageEvent> {
    events
        .into_iter()
        .map(|(ts, tokens)| {
            UsageEvent::new(
                ts,
                ModelName::new("claude-sonnet-4-20250514"),
                TokenCounts::new(tokens, 0, 0, 0),
                tokens as f64 / 1_000_000.0,
            )
        })
        .collect()
}

/// A first-cycle view over `(timestamp, input tokens)` events
///
/// Each event costs one dollar per million tokens.
pub fn view_at(events: Vec<(DateTime<Utc>, u64)>, now: DateTime<Utc>, plan: Plan) -> ViewModel {
    compute(usage_events(events), now, &plan, &mut MonitorState::new())
}

/// Consecutive cycles of one monitor over the same history
pub fn views_over(
    events: Vec<(DateTime<Utc>, u64)>,
    instants: &[DateTime<Utc>],
    plan: Plan,
) -> Vec<ViewModel> {
    let events = usage_events(events);
    let mut monitor = Monitor::new(plan);
    instants
        .iter()
        .map(|now| monitor.tick(events.clone(), *now))
        .collect()
}
