//! Burn rate and depletion prediction
//!
//! The burn rate is the token velocity over a trailing lookback window
//! (60 minutes by default). Every block whose window intersects
//! `[now - lookback, now]` contributes the events that fall inside that
//! range, and the sum is divided by the minutes actually covered: from the
//! later of `now - lookback` and the earliest contributing block's start, up
//! to `now`. Right after a block opens this gives the real velocity instead
//! of diluting it over a full hour.
//!
//! The prediction projects that velocity forward against what is left of the
//! effective limit and compares the depletion instant with the block's reset.
//! All arithmetic is in `f64` minutes and nothing is rounded here.

use crate::blocks::{SessionBlock, SessionBlocks};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Default lookback window in minutes
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;

/// Default lookback window
pub fn default_lookback() -> Duration {
    Duration::minutes(DEFAULT_LOOKBACK_MINUTES)
}

fn as_minutes(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}

/// Token velocity over the lookback window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BurnRateSample {
    /// Tokens per minute, never negative
    pub tokens_per_minute: f64,
    /// Tokens counted inside the window
    pub tokens_in_window: u64,
    /// Minutes actually covered by the window, the divisor
    pub window_minutes: f64,
    /// Configured lookback in minutes
    pub lookback_minutes: f64,
}

impl BurnRateSample {
    /// A zero-rate sample, the "insufficient history" state
    pub fn zero(lookback: Duration) -> Self {
        Self {
            tokens_per_minute: 0.0,
            tokens_in_window: 0,
            window_minutes: 0.0,
            lookback_minutes: as_minutes(lookback),
        }
    }

    /// Whether no consumption was observed
    pub fn is_zero(&self) -> bool {
        self.tokens_per_minute <= 0.0
    }
}

/// Compute the burn rate at `now` over `lookback`
pub fn calculate_burn_rate(
    blocks: &SessionBlocks,
    now: DateTime<Utc>,
    lookback: Duration,
) -> BurnRateSample {
    let window_start = now - lookback;
    let mut earliest_start: Option<DateTime<Utc>> = None;
    let mut tokens_in_window = 0u64;

    for block in blocks
        .blocks()
        .iter()
        .filter(|b| b.overlaps(window_start, now))
    {
        earliest_start.get_or_insert(block.start_time());
        tokens_in_window = block
            .events()
            .iter()
            .filter(|e| e.time() >= window_start && e.time() <= now)
            .fold(tokens_in_window, |acc, e| acc.saturating_add(e.total_tokens()));
    }

    let Some(earliest_start) = earliest_start else {
        return BurnRateSample::zero(lookback);
    };

    let window_minutes = as_minutes(now - earliest_start.max(window_start));
    let tokens_per_minute = if tokens_in_window == 0 || window_minutes <= 0.0 {
        0.0
    } else {
        tokens_in_window as f64 / window_minutes
    };

    BurnRateSample {
        tokens_per_minute,
        tokens_in_window,
        window_minutes: window_minutes.max(0.0),
        lookback_minutes: as_minutes(lookback),
    }
}

/// When the remaining budget runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepletionTime {
    /// No consumption, the budget never runs out at this rate
    Never,
    /// Projected depletion instant
    At(DateTime<Utc>),
}

impl DepletionTime {
    /// The instant, if depletion is expected
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Never => None,
            Self::At(t) => Some(*t),
        }
    }
}

/// Projection for the active block
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Projected depletion
    pub depletion_time: DepletionTime,
    /// Minutes from `now` to depletion, `None` when it never happens
    pub minutes_to_depletion: Option<f64>,
    /// The active block's reset instant
    pub reset_time: DateTime<Utc>,
    /// Depletion comes strictly before the reset
    pub will_deplete_before_reset: bool,
}

impl PredictionResult {
    fn never(reset_time: DateTime<Utc>) -> Self {
        Self {
            depletion_time: DepletionTime::Never,
            minutes_to_depletion: None,
            reset_time,
            will_deplete_before_reset: false,
        }
    }
}

/// Predict depletion of `block` under `token_limit` at the sampled rate
pub fn predict(
    block: &SessionBlock,
    burn_rate: &BurnRateSample,
    token_limit: u64,
    now: DateTime<Utc>,
) -> PredictionResult {
    let reset_time = block.end_time();
    let rate = burn_rate.tokens_per_minute;
    if !rate.is_finite() || rate <= 0.0 {
        return PredictionResult::never(reset_time);
    }

    let remaining = token_limit.saturating_sub(block.total_tokens());
    let minutes_to_depletion = remaining as f64 / rate;

    // Far-future projections that overflow the calendar never deplete
    let depletion = Duration::try_milliseconds((minutes_to_depletion * 60_000.0) as i64)
        .and_then(|offset| now.checked_add_signed(offset));
    let Some(depletion) = depletion else {
        return PredictionResult::never(reset_time);
    };

    PredictionResult {
        depletion_time: DepletionTime::At(depletion),
        minutes_to_depletion: Some(minutes_to_depletion),
        reset_time,
        will_deplete_before_reset: depletion < reset_time,
    }
}
