//! Per-cycle computation
//!
//! [`compute`] is the single entry point of the core. It takes the full event
//! history, the current instant, the configured plan and the monitor's state,
//! and produces a [`ViewModel`] for the renderer. The only side effect is the
//! update of the passed [`MonitorState`]; there are no timers or globals.
//!
//! # Examples
//!
//! ```
//! use ccmonitor_core::{Monitor, Plan};
//! use ccmonitor_core::types::{ModelName, TokenCounts, UsageEvent};
//! use chrono::{TimeZone, Utc};
//!
//! let ten = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
//! let event = UsageEvent::new(
//!     ten,
//!     ModelName::new("claude-sonnet-4-20250514"),
//!     TokenCounts::new(1000, 0, 0, 0),
//!     0.0,
//! );
//!
//! let mut monitor = Monitor::new(Plan::pro());
//! let view = monitor.tick(vec![event], ten);
//! assert!(view.has_active_session());
//! assert_eq!(view.tokens_used(), 1000);
//! ```

use crate::blocks::{SessionBlock, SessionBlocks};
use crate::burn_rate::{
    BurnRateSample, PredictionResult, calculate_burn_rate, default_lookback, predict,
};
use crate::limits::LimitDetector;
use crate::notifications::{NotificationKind, NotificationState};
use crate::plan::Plan;
use crate::types::UsageEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// State carried from one cycle to the next
///
/// One value per monitor instance. Holds the sticky plan escalation and the
/// notifications already fired for the current block.
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub limits: LimitDetector,
    pub notifications: NotificationState,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Everything the renderer needs for one cycle
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    /// Instant the cycle was computed at
    pub now: DateTime<Utc>,
    /// The active block, `None` when there is no active session
    pub active_block: Option<SessionBlock>,
    /// Plan in effect, with a resolved limit
    pub effective_plan: Plan,
    /// Plan the monitor was started with
    pub configured_plan: Plan,
    /// `None` exactly when there is no active session
    pub burn_rate: Option<BurnRateSample>,
    /// `None` exactly when there is no active session
    pub prediction: Option<PredictionResult>,
    /// Kinds that fired on this cycle
    pub newly_fired_notifications: Vec<NotificationKind>,
    /// Number of blocks in the history
    pub block_count: usize,
}

impl ViewModel {
    pub fn has_active_session(&self) -> bool {
        self.active_block.is_some()
    }

    /// Effective token limit
    pub fn token_limit(&self) -> u64 {
        self.effective_plan.limit_or_default()
    }

    /// Tokens used in the active block
    pub fn tokens_used(&self) -> u64 {
        self.active_block
            .as_ref()
            .map(SessionBlock::total_tokens)
            .unwrap_or(0)
    }

    /// Tokens left under the limit, negative once the limit is exceeded
    pub fn tokens_left(&self) -> i64 {
        let limit = i64::try_from(self.token_limit()).unwrap_or(i64::MAX);
        let used = i64::try_from(self.tokens_used()).unwrap_or(i64::MAX);
        limit.saturating_sub(used)
    }

    /// Usage as a percentage of the limit, may exceed 100
    pub fn usage_percentage(&self) -> f64 {
        match self.token_limit() {
            0 => 0.0,
            limit => self.tokens_used() as f64 / limit as f64 * 100.0,
        }
    }

    /// Minutes since the active block opened
    pub fn elapsed_minutes(&self) -> f64 {
        self.active_block
            .as_ref()
            .map(|b| (self.now - b.start_time()).num_seconds() as f64 / 60.0)
            .unwrap_or(0.0)
    }

    /// Minutes until the active block resets
    pub fn minutes_to_reset(&self) -> f64 {
        self.active_block
            .as_ref()
            .map(|b| ((b.end_time() - self.now).num_seconds() as f64 / 60.0).max(0.0))
            .unwrap_or(0.0)
    }

    /// Tokens per minute, 0 without an active session
    pub fn tokens_per_minute(&self) -> f64 {
        self.burn_rate
            .as_ref()
            .map(|s| s.tokens_per_minute)
            .unwrap_or(0.0)
    }

    pub fn fired(&self, kind: NotificationKind) -> bool {
        self.newly_fired_notifications.contains(&kind)
    }
}

/// Run one monitoring cycle
///
/// Builds the block history, resolves the limit, samples the burn rate,
/// predicts depletion for the active block and evaluates notifications.
/// Never fails: an empty history is the "no active session" state.
pub fn compute<I>(events: I, now: DateTime<Utc>, plan: &Plan, state: &mut MonitorState) -> ViewModel
where
    I: IntoIterator<Item = UsageEvent>,
{
    let blocks = SessionBlocks::build(events, now);
    let resolution = state.limits.resolve(&blocks, plan);
    let limit = resolution.token_limit();
    let active = blocks.active();

    state
        .notifications
        .observe_block(active.map(SessionBlock::start_time));

    let Some(active) = active else {
        debug!("No active session among {} blocks", blocks.len());
        return ViewModel {
            now,
            active_block: None,
            effective_plan: resolution.effective_plan,
            configured_plan: *plan,
            burn_rate: None,
            prediction: None,
            newly_fired_notifications: Vec::new(),
            block_count: blocks.len(),
        };
    };

    let burn_rate = calculate_burn_rate(&blocks, now, default_lookback());
    let prediction = predict(active, &burn_rate, limit, now);

    let conditions = [
        (NotificationKind::LimitExceeded, resolution.escalated_now),
        (NotificationKind::PlanFallback, resolution.fell_back),
        (
            NotificationKind::TokensExceeded,
            active.total_tokens() > limit,
        ),
        (
            NotificationKind::DepletionWarning,
            prediction.will_deplete_before_reset,
        ),
    ];
    let newly_fired: Vec<NotificationKind> = conditions
        .into_iter()
        .filter(|&(kind, condition)| state.notifications.evaluate(kind, condition))
        .map(|(kind, _)| kind)
        .collect();

    if !newly_fired.is_empty() {
        debug!("Notifications fired: {:?}", newly_fired);
    }

    ViewModel {
        now,
        active_block: Some(active.clone()),
        effective_plan: resolution.effective_plan,
        configured_plan: *plan,
        burn_rate: Some(burn_rate),
        prediction: Some(prediction),
        newly_fired_notifications: newly_fired,
        block_count: blocks.len(),
    }
}

/// A configured plan with its cross-cycle state
#[derive(Debug, Clone)]
pub struct Monitor {
    plan: Plan,
    state: MonitorState,
}

impl Monitor {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            state: MonitorState::new(),
        }
    }

    /// The plan the monitor was configured with
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Run one cycle over the full history
    pub fn tick<I>(&mut self, events: I, now: DateTime<Utc>) -> ViewModel
    where
        I: IntoIterator<Item = UsageEvent>,
    {
        compute(events, now, &self.plan, &mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burn_rate::DepletionTime;
    use crate::plan::PlanName;
    use crate::test_utils::{at, event};
    use chrono::Duration;

    #[test]
    fn test_single_event_active_block() {
        let mut state = MonitorState::new();
        let view = compute(vec![event(at(10, 0), 1000)], at(10, 0), &Plan::pro(), &mut state);

        let block = view.active_block.as_ref().unwrap();
        assert_eq!(block.start_time(), at(10, 0));
        assert_eq!(block.end_time(), at(15, 0));
        assert_eq!(view.tokens_used(), 1000);
        assert_eq!(view.block_count, 1);
    }

    #[test]
    fn test_no_active_session() {
        let mut state = MonitorState::new();
        let view = compute(vec![event(at(10, 0), 1000)], at(16, 0), &Plan::pro(), &mut state);

        assert!(!view.has_active_session());
        assert!(view.burn_rate.is_none());
        assert!(view.prediction.is_none());
        assert!(view.newly_fired_notifications.is_empty());
        assert_eq!(view.tokens_used(), 0);
        assert_eq!(view.block_count, 1);
    }

    #[test]
    fn test_empty_history() {
        let mut state = MonitorState::new();
        let view = compute(Vec::new(), at(10, 0), &Plan::pro(), &mut state);
        assert!(!view.has_active_session());
        assert_eq!(view.block_count, 0);
        assert_eq!(view.effective_plan, Plan::pro());
    }

    #[test]
    fn test_escalation_to_historical_peak() {
        // Completed block of 60000 yesterday evening, active block of 50000
        let events = vec![
            event(at(0, 0), 60_000),
            event(at(10, 0), 50_000),
        ];
        let mut state = MonitorState::new();
        let view = compute(events, at(11, 0), &Plan::pro(), &mut state);

        assert_eq!(view.effective_plan, Plan::custom_max(60_000));
        assert_eq!(view.configured_plan, Plan::pro());
        assert_eq!(
            view.newly_fired_notifications
                .iter()
                .filter(|k| **k == NotificationKind::LimitExceeded)
                .count(),
            1
        );
        assert!(!view.fired(NotificationKind::PlanFallback));
        assert!(!view.fired(NotificationKind::TokensExceeded));
    }

    #[test]
    fn test_escalation_is_idempotent() {
        let events = vec![event(at(0, 0), 60_000), event(at(10, 0), 50_000)];
        let plan = Plan::pro();
        let mut state = MonitorState::new();

        let first = compute(events.clone(), at(11, 0), &plan, &mut state);
        assert!(first.fired(NotificationKind::LimitExceeded));

        for minute in 1..10 {
            let view = compute(events.clone(), at(11, minute), &plan, &mut state);
            assert!(!view.fired(NotificationKind::LimitExceeded));
            assert_eq!(view.effective_plan.name, PlanName::CustomMax);
        }
    }

    #[test]
    fn test_escalation_without_history_fires_fallback_too() {
        let mut state = MonitorState::new();
        let view = compute(vec![event(at(10, 0), 50_000)], at(11, 0), &Plan::pro(), &mut state);

        assert!(view.fired(NotificationKind::LimitExceeded));
        assert!(view.fired(NotificationKind::PlanFallback));
        assert!(view.fired(NotificationKind::TokensExceeded));
        assert_eq!(view.token_limit(), 44_000);

        let again = compute(vec![event(at(10, 0), 50_000)], at(11, 3), &Plan::pro(), &mut state);
        assert!(again.newly_fired_notifications.is_empty());
    }

    #[test]
    fn test_depletion_warning_fires_once_over_many_cycles() {
        // 40000 tokens in the first hour, well on the way to 44000
        let events: Vec<_> = (0..40)
            .map(|i| event(at(10, 0) + Duration::minutes(i), 1_000))
            .collect();
        let plan = Plan::pro();
        let mut state = MonitorState::new();

        let fired_cycles = (0..20)
            .map(|cycle| {
                let now = at(10, 40) + Duration::seconds(3 * cycle);
                compute(events.clone(), now, &plan, &mut state)
            })
            .filter(|view| view.fired(NotificationKind::DepletionWarning))
            .count();
        assert_eq!(fired_cycles, 1);
    }

    #[test]
    fn test_new_block_rearms_depletion_warning() {
        let plan = Plan::pro();
        let mut state = MonitorState::new();
        let heavy = |start: DateTime<Utc>| -> Vec<UsageEvent> {
            (0..40)
                .map(|i| event(start + Duration::minutes(i), 1_000))
                .collect()
        };

        let first = compute(heavy(at(0, 0)), at(0, 40), &plan, &mut state);
        assert!(first.fired(NotificationKind::DepletionWarning));

        let mut events = heavy(at(0, 0));
        events.extend(heavy(at(6, 0)));
        let second = compute(events, at(6, 40), &plan, &mut state);
        assert!(second.fired(NotificationKind::DepletionWarning));
    }

    #[test]
    fn test_burn_rate_and_prediction() {
        let events = vec![
            event(at(10, 0), 200),
            event(at(10, 10), 200),
            event(at(10, 25), 200),
        ];
        let mut state = MonitorState::new();
        let view = compute(events, at(10, 30), &Plan::pro(), &mut state);

        assert!((view.tokens_per_minute() - 20.0).abs() < 1e-9);
        let prediction = view.prediction.unwrap();
        // (44000 - 600) / 20 = 2170 minutes, long after the 15:00 reset
        assert_eq!(prediction.minutes_to_depletion, Some(2170.0));
        assert!(!prediction.will_deplete_before_reset);
        assert!(view.newly_fired_notifications.is_empty());
    }

    #[test]
    fn test_zero_burn_rate_never_depletes() {
        // Only event sits exactly at now, so no elapsed time
        let mut state = MonitorState::new();
        let view = compute(vec![event(at(10, 0), 100)], at(10, 0), &Plan::pro(), &mut state);
        assert_eq!(view.tokens_per_minute(), 0.0);
        assert_eq!(view.prediction.unwrap().depletion_time, DepletionTime::Never);
    }

    #[test]
    fn test_view_model_accessors() {
        let mut state = MonitorState::new();
        let view = compute(vec![event(at(10, 0), 11_000)], at(11, 0), &Plan::pro(), &mut state);

        assert_eq!(view.token_limit(), 44_000);
        assert_eq!(view.tokens_left(), 33_000);
        assert!((view.usage_percentage() - 25.0).abs() < 1e-9);
        assert!((view.elapsed_minutes() - 60.0).abs() < 1e-9);
        assert!((view.minutes_to_reset() - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_token_counts_saturate() {
        let half = u64::MAX / 2 + 1;
        let events = vec![event(at(10, 0), half), event(at(10, 1), half)];
        let mut state = MonitorState::new();
        let view = compute(events, at(10, 30), &Plan::pro(), &mut state);

        assert_eq!(view.tokens_used(), u64::MAX);
        assert_eq!(view.tokens_left(), 44_000 - i64::MAX);
        assert!(view.tokens_per_minute().is_finite());
        assert!(view.fired(NotificationKind::LimitExceeded));
    }

    #[test]
    fn test_monitor_tick_keeps_state() {
        let mut monitor = Monitor::new(Plan::pro());
        let events = vec![event(at(0, 0), 60_000), event(at(10, 0), 50_000)];

        assert!(monitor.tick(events.clone(), at(11, 0)).fired(NotificationKind::LimitExceeded));
        assert!(monitor.state().limits.is_escalated());
        assert!(!monitor.tick(events, at(11, 1)).fired(NotificationKind::LimitExceeded));
        assert_eq!(monitor.plan(), &Plan::pro());
    }

    #[test]
    fn test_view_model_serializes() {
        let mut state = MonitorState::new();
        let view = compute(vec![event(at(10, 0), 1000)], at(10, 30), &Plan::pro(), &mut state);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["effective_plan"]["name"], "pro");
        assert_eq!(json["active_block"]["total_tokens"], 1000);
        assert!(json["burn_rate"]["tokens_per_minute"].is_number());
    }
}
