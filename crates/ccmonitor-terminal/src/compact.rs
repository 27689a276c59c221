//! Single-line display
//!
//! `Claude : 9.2K/35.0K (26.3%) | 🔥51.9/min | End: 02:13 | Reset: 18:00 | 17:57:08`
//!
//! The fields on the line are configurable with [`CompactFields`]; the
//! default set produces the line above. Notifications follow on their own
//! lines so they are not lost in the compact view, and stay for a few cycles
//! after they fire.

use crate::format::{
    format_cost, format_minutes, format_number, format_tokens, notification_message,
    predicted_end, reset_time,
};
use crate::notices::NotificationBoard;
use ccmonitor_core::error::CcmonitorError;
use ccmonitor_core::{NotificationKind, TimezoneConfig, ViewModel};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: &str = " | ";
const PREFIX: &str = "Claude : ";

/// One value on the compact line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactField {
    /// `9.2K/35.0K`
    Tokens,
    /// `26.3%`, in parentheses right after `Tokens`
    Percentage,
    /// `🔥51.9/min`
    BurnRate,
    /// `End: 02:13`
    PredictedEnd,
    /// `Reset: 18:00`
    ResetTime,
    /// `17:57:08`
    CurrentTime,
    /// `Left: 3h 12m`
    TimeRemaining,
    /// `$0.1234`
    Cost,
    /// Effective plan name
    PlanInfo,
}

impl CompactField {
    pub const ALL: [CompactField; 9] = [
        Self::Tokens,
        Self::Percentage,
        Self::BurnRate,
        Self::PredictedEnd,
        Self::ResetTime,
        Self::CurrentTime,
        Self::TimeRemaining,
        Self::Cost,
        Self::PlanInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Percentage => "percentage",
            Self::BurnRate => "burn_rate",
            Self::PredictedEnd => "predicted_end",
            Self::ResetTime => "reset_time",
            Self::CurrentTime => "current_time",
            Self::TimeRemaining => "time_remaining",
            Self::Cost => "cost",
            Self::PlanInfo => "plan_info",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for CompactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free selection of compact fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactFields(Vec<CompactField>);

impl CompactFields {
    pub fn fields(&self) -> &[CompactField] {
        &self.0
    }
}

impl Default for CompactFields {
    fn default() -> Self {
        Self(vec![
            CompactField::Tokens,
            CompactField::Percentage,
            CompactField::BurnRate,
            CompactField::PredictedEnd,
            CompactField::ResetTime,
            CompactField::CurrentTime,
        ])
    }
}

impl FromStr for CompactFields {
    type Err = CcmonitorError;

    /// Parse a comma separated list such as `tokens,burn_rate,cost`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        let mut available: Vec<&str> = CompactField::ALL.iter().map(|f| f.as_str()).collect();
        available.sort_unstable();
        if names.is_empty() {
            return Err(CcmonitorError::InvalidArgument(format!(
                "no compact fields given. Available: {}",
                available.join(", ")
            )));
        }

        let invalid: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| CompactField::from_name(name).is_none())
            .collect();
        if !invalid.is_empty() {
            return Err(CcmonitorError::InvalidArgument(format!(
                "Invalid fields: {}. Available: {}",
                invalid.join(", "),
                available.join(", ")
            )));
        }

        let mut fields = Vec::new();
        for field in names.into_iter().filter_map(CompactField::from_name) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        Ok(Self(fields))
    }
}

/// Formatter for `--compact`
#[derive(Debug, Clone)]
pub struct CompactFormatter {
    timezone: TimezoneConfig,
    fields: CompactFields,
    notices: NotificationBoard,
}

impl CompactFormatter {
    pub fn new(timezone: TimezoneConfig) -> Self {
        Self {
            timezone,
            fields: CompactFields::default(),
            notices: NotificationBoard::new(),
        }
    }

    /// Choose which fields the status line shows
    pub fn with_fields(mut self, fields: CompactFields) -> Self {
        self.fields = fields;
        self
    }

    /// Status line plus the notifications still on the board
    pub fn format(&mut self, view: &ViewModel) -> String {
        let mut output = if view.has_active_session() {
            self.format_line(view)
        } else {
            self.format_no_session(view)
        };

        for kind in self.notices.update(view) {
            output.push_str("\n\n");
            output.push_str(&notification_line(kind, view));
        }
        output
    }

    /// The status line for an active session
    pub fn format_line(&self, view: &ViewModel) -> String {
        let fields = self.fields.fields();
        let mut parts: Vec<String> = Vec::with_capacity(fields.len());

        for (i, field) in fields.iter().enumerate() {
            let percentage_follows = fields.get(i + 1) == Some(&CompactField::Percentage);
            let previous_was_tokens = i > 0 && fields[i - 1] == CompactField::Tokens;
            let part = match field {
                CompactField::Tokens if percentage_follows => format!(
                    "{}/{} ({:.1}%)",
                    format_tokens(view.tokens_used()),
                    format_tokens(view.token_limit()),
                    view.usage_percentage()
                ),
                CompactField::Tokens => format!(
                    "{}/{}",
                    format_tokens(view.tokens_used()),
                    format_tokens(view.token_limit())
                ),
                CompactField::Percentage if previous_was_tokens => continue,
                CompactField::Percentage => format!("{:.1}%", view.usage_percentage()),
                CompactField::BurnRate => format!("🔥{:.1}/min", view.tokens_per_minute()),
                CompactField::PredictedEnd => match predicted_end(view, &self.timezone) {
                    Some(end) => format!("End: {}", end),
                    None => continue,
                },
                CompactField::ResetTime => match reset_time(view, &self.timezone) {
                    Some(reset) => format!("Reset: {}", reset),
                    None => continue,
                },
                CompactField::CurrentTime => self.timezone.format_hms(view.now),
                CompactField::TimeRemaining => {
                    format!("Left: {}", format_minutes(view.minutes_to_reset()))
                }
                CompactField::Cost => format_cost(
                    view.active_block
                        .as_ref()
                        .map(|b| b.total_cost())
                        .unwrap_or(0.0),
                ),
                CompactField::PlanInfo => view.effective_plan.name.to_string(),
            };
            parts.push(part);
        }

        format!("{}{}", PREFIX, parts.join(SEPARATOR))
    }

    /// The status line when no block is active
    pub fn format_no_session(&self, view: &ViewModel) -> String {
        [
            format!("{}0/{} (0.0%)", PREFIX, format_number(view.token_limit())),
            "🔥0.0/min".to_string(),
            "No active session".to_string(),
            self.timezone.format_hms(view.now),
        ]
        .join(SEPARATOR)
    }
}

fn notification_line(kind: NotificationKind, view: &ViewModel) -> String {
    let prefix = match kind {
        NotificationKind::LimitExceeded => "🔄 WARNING:",
        NotificationKind::PlanFallback => "ℹ️ NOTICE:",
        NotificationKind::TokensExceeded => "🚨 ERROR:",
        NotificationKind::DepletionWarning => "⚠️ ERROR:",
    };
    format!("{} {}", prefix, notification_message(kind, view))
}
