//! Number, duration and message formatting shared by both renderers

use ccmonitor_core::burn_rate::DepletionTime;
use ccmonitor_core::{NotificationKind, TimezoneConfig, ViewModel};

/// Burn rate below this is slow, in tokens per minute
pub const SLOW_BURN_RATE: f64 = 50.0;
/// Burn rate below this is normal
pub const NORMAL_BURN_RATE: f64 = 150.0;
/// Burn rate below this is fast, anything above is very fast
pub const FAST_BURN_RATE: f64 = 300.0;

/// Qualitative speed of token consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Velocity {
    Slow,
    Normal,
    Fast,
    VeryFast,
}

impl Velocity {
    pub fn from_rate(tokens_per_minute: f64) -> Self {
        if tokens_per_minute < SLOW_BURN_RATE {
            Self::Slow
        } else if tokens_per_minute < NORMAL_BURN_RATE {
            Self::Normal
        } else if tokens_per_minute < FAST_BURN_RATE {
            Self::Fast
        } else {
            Self::VeryFast
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Slow => "SLOW",
            Self::Normal => "NORMAL",
            Self::Fast => "FAST",
            Self::VeryFast => "VERY FAST",
        }
    }
}

/// Format a number with thousands separators
pub fn format_number(num: u64) -> String {
    let s = num.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Signed variant of [`format_number`]
pub fn format_signed(num: i64) -> String {
    if num < 0 {
        format!("-{}", format_number(num.unsigned_abs()))
    } else {
        format_number(num as u64)
    }
}

/// Compact token count: `950`, `9.2K`, `1.5M`
pub fn format_tokens(tokens: u64) -> String {
    if tokens >= 1_000_000 {
        format!("{:.1}M", tokens as f64 / 1_000_000.0)
    } else if tokens >= 1_000 {
        format!("{:.1}K", tokens as f64 / 1_000.0)
    } else {
        tokens.to_string()
    }
}

/// Dollar amount with four decimals
pub fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost.max(0.0))
}

/// Minutes as `45m`, `2h` or `3h 12m`
pub fn format_minutes(minutes: f64) -> String {
    let minutes = minutes.max(0.0);
    if minutes < 60.0 {
        return format!("{}m", minutes as u64);
    }
    let hours = (minutes / 60.0) as u64;
    let mins = (minutes % 60.0) as u64;
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Predicted end as `HH:MM`, the reset time when tokens never run out
pub fn predicted_end(view: &ViewModel, timezone: &TimezoneConfig) -> Option<String> {
    let prediction = view.prediction.as_ref()?;
    let instant = match prediction.depletion_time {
        DepletionTime::At(t) => t,
        DepletionTime::Never => prediction.reset_time,
    };
    Some(timezone.format_hm(instant))
}

/// Reset time as `HH:MM`
pub fn reset_time(view: &ViewModel, timezone: &TimezoneConfig) -> Option<String> {
    view.prediction
        .as_ref()
        .map(|p| timezone.format_hm(p.reset_time))
}

/// Human-readable text for a fired notification
pub fn notification_message(kind: NotificationKind, view: &ViewModel) -> String {
    let limit = format_number(view.token_limit());
    match kind {
        NotificationKind::LimitExceeded => format!(
            "Tokens exceeded {} limit - switched to custom_max ({})",
            view.configured_plan.name.as_str().to_uppercase(),
            limit
        ),
        NotificationKind::PlanFallback => format!(
            "No completed sessions to size custom_max - using the Pro limit ({})",
            limit
        ),
        NotificationKind::TokensExceeded => format!(
            "TOKENS EXCEEDED MAX LIMIT! ({} > {})",
            format_number(view.tokens_used()),
            limit
        ),
        NotificationKind::DepletionWarning => "Tokens will run out BEFORE reset!".to_string(),
    }
}
