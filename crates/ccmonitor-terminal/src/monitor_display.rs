//! Full-screen live display
//!
//! Draws the current [`ViewModel`] as a boxed panel: token usage and time to
//! reset as progress bars, the token, cost and burn-rate details, the
//! predicted end and reset times in the display timezone, the notifications
//! still on the board and a status line.

use crate::format::{
    Velocity, format_cost, format_minutes, format_number, format_signed, notification_message,
    predicted_end, reset_time,
};
use crate::notices::NotificationBoard;
use crate::theme::{Theme, Tone};
use ccmonitor_core::{TimezoneConfig, ViewModel};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::trace;

const BOX_CORNER: &str = "+";
const BOX_HORIZONTAL: &str = "-";
const BOX_VERTICAL: &str = "|";

const PROGRESS_FULL: &str = "#";
const PROGRESS_EMPTY: &str = ".";
const BAR_WIDTH: usize = 40;

/// Usage at or above this percentage is drawn as a warning
const USAGE_WARNING_THRESHOLD: f64 = 50.0;
/// Usage at or above this percentage is drawn as critical
const USAGE_CRITICAL_THRESHOLD: f64 = 90.0;

const TITLE: &str = "CCMONITOR - CLAUDE TOKEN USAGE";

/// Renderer for the full-screen mode
pub struct MonitorDisplay {
    width: usize,
    timezone: TimezoneConfig,
    refresh_seconds: u64,
    theme: Theme,
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
    notices: NotificationBoard,
}

impl MonitorDisplay {
    /// Create a display sized to the current terminal
    pub fn new(timezone: TimezoneConfig, refresh_seconds: u64) -> Self {
        let raw_width = terminal_width().unwrap_or_else(|| {
            trace!("Terminal width unavailable, using 100 columns");
            100
        });
        let width = if raw_width < 60 {
            raw_width.max(20)
        } else {
            raw_width.clamp(60, 100)
        };
        Self {
            width,
            timezone,
            refresh_seconds,
            theme: Theme::Auto.resolve(),
            colored_output: std::env::var("NO_COLOR").is_err(),
            notices: NotificationBoard::new(),
        }
    }

    /// Pick the palette, resolving `Auto` against the terminal
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme.resolve();
        self
    }

    /// Force colors on or off
    pub fn with_color(mut self, colored_output: bool) -> Self {
        self.colored_output = colored_output;
        self
    }

    /// Override the detected width
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    /// Render a cycle, falling back to the no-session screen
    ///
    /// Notifications stay on screen for a few cycles after they fire, so
    /// rendering updates the display's notification board.
    pub fn render(&mut self, view: &ViewModel) -> String {
        let notices = self.notices.update(view);
        let Some(block) = view.active_block.as_ref() else {
            return self.render_no_session(view);
        };

        let mut output = String::new();
        output.push_str(&self.draw_header());

        // Progress bars
        let usage = view.usage_percentage();
        let usage_bar = self.progress_bar(usage, usage_tone(usage));
        output.push_str(&self.draw_line(&format!(
            "TOKENS  {}  {:5.1}%",
            usage_bar,
            usage.min(999.9)
        )));

        let total_minutes = (block.end_time() - block.start_time()).num_seconds() as f64 / 60.0;
        let elapsed_pct = if total_minutes > 0.0 {
            view.elapsed_minutes() / total_minutes * 100.0
        } else {
            0.0
        };
        let time_bar = self.progress_bar(elapsed_pct, Tone::Muted);
        output.push_str(&self.draw_line(&format!(
            "RESET   {}  {} left",
            time_bar,
            format_minutes(view.minutes_to_reset())
        )));
        output.push_str(&self.draw_blank());

        // Details
        output.push_str(&self.draw_line(&format!(
            "   Tokens:     {} / ~{} ({} left)",
            format_number(view.tokens_used()),
            format_number(view.token_limit()),
            format_signed(view.tokens_left())
        )));
        output.push_str(&self.draw_line(&format!(
            "   Session Cost: {}",
            format_cost(block.total_cost())
        )));
        let rate = view.tokens_per_minute();
        output.push_str(&self.draw_line(&format!(
            "   Burn Rate:  {:.1} tokens/min ({})",
            rate,
            self.velocity_label(Velocity::from_rate(rate))
        )));
        output.push_str(&self.draw_blank());

        let end = predicted_end(view, &self.timezone).unwrap_or_default();
        let reset = reset_time(view, &self.timezone).unwrap_or_default();
        output.push_str(&self.draw_line(&format!("   Predicted End:  {}", end)));
        output.push_str(&self.draw_line(&format!("   Token Reset:    {}", reset)));
        output.push_str(&self.draw_line(&format!(
            "   Plan: {}  Models: {}",
            view.effective_plan,
            block
                .models_used()
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));

        // Notifications
        if !notices.is_empty() {
            output.push_str(&self.draw_separator());
            for kind in notices {
                let message = notification_message(kind, view);
                output.push_str(&self.draw_line(&self.paint(&message, Tone::Critical)));
            }
        }

        let (status, tone) = status_message(view);
        output.push_str(&self.draw_separator());
        output.push_str(&self.draw_status(view.now, &self.paint(status, tone)));
        output.push_str(&self.draw_box_bottom());
        output
    }

    /// Screen shown when no block is active
    pub fn render_no_session(&self, view: &ViewModel) -> String {
        let mut output = String::new();
        output.push_str(&self.draw_header());
        output.push_str(&self.draw_line(&format!(
            "TOKENS  {}  {:5.1}%",
            self.progress_bar(0.0, Tone::Good),
            0.0
        )));
        output.push_str(&self.draw_blank());
        output.push_str(&self.draw_line(&format!(
            "   Tokens:     0 / ~{} (0 left)",
            format_number(view.token_limit())
        )));
        output.push_str(&self.draw_line("   Burn Rate:  0.0 tokens/min"));
        output.push_str(&self.draw_separator());
        output.push_str(&self.draw_status(view.now, "No active session"));
        output.push_str(&self.draw_box_bottom());
        output
    }

    /// Screen shown when the usage source failed
    pub fn render_error(&self, message: &str, now: DateTime<Utc>) -> String {
        let mut output = String::new();
        output.push_str(&self.draw_header());
        output.push_str(&self.draw_line(&self.paint("Failed to get usage data", Tone::Critical)));
        output.push_str(&self.draw_line(&format!("   {}", message)));
        output.push_str(&self.draw_blank());
        output.push_str(&self.draw_line(&self.paint("Possible causes:", Tone::Warning)));
        output.push_str(&self.draw_line("  - Claude Code has not written any usage logs yet"));
        output.push_str(&self.draw_line("  - CLAUDE_CONFIG_DIR points to the wrong place"));
        output.push_str(&self.draw_separator());
        output.push_str(&self.draw_line(&format!(
            "{}  Retrying in {} seconds... (Ctrl+C to exit)",
            self.timezone.format_hms(now),
            self.refresh_seconds
        )));
        output.push_str(&self.draw_box_bottom());
        output
    }

    fn draw_header(&self) -> String {
        let mut output = self.horizontal_rule();
        output.push_str(&self.draw_centered_line(TITLE));
        output.push_str(&self.draw_separator());
        output
    }

    fn horizontal_rule(&self) -> String {
        format!(
            "{}{}{}",
            BOX_CORNER,
            BOX_HORIZONTAL.repeat(self.width.saturating_sub(2)),
            BOX_CORNER
        )
    }

    fn draw_box_bottom(&self) -> String {
        format!("\n{}", self.horizontal_rule())
    }

    fn draw_separator(&self) -> String {
        format!("\n{}", self.horizontal_rule())
    }

    fn draw_blank(&self) -> String {
        self.draw_line("")
    }

    fn draw_status(&self, now: DateTime<Utc>, message: &str) -> String {
        self.draw_line(&format!(
            "{}  {}  | Refreshing every {}s - Ctrl+C to exit",
            self.timezone.format_hms(now),
            message,
            self.refresh_seconds
        ))
    }

    fn draw_centered_line(&self, text: &str) -> String {
        let text_width = console::measure_text_width(text);
        let available_width = self.width.saturating_sub(2);
        if text_width >= available_width {
            return format!("\n{} {} {}", BOX_VERTICAL, text, BOX_VERTICAL);
        }
        let padding = (available_width - text_width) / 2;
        format!(
            "\n{}{}{}{}{}",
            BOX_VERTICAL,
            " ".repeat(padding),
            text,
            " ".repeat(available_width - padding - text_width),
            BOX_VERTICAL
        )
    }

    fn draw_line(&self, content: &str) -> String {
        let available_width = self.width.saturating_sub(4);
        let truncated = console::truncate_str(content, available_width, "...");
        let padding = available_width.saturating_sub(console::measure_text_width(&truncated));
        format!(
            "\n{} {}{} {}",
            BOX_VERTICAL,
            truncated,
            " ".repeat(padding),
            BOX_VERTICAL
        )
    }

    fn progress_bar(&self, percentage: f64, tone: Tone) -> String {
        let clamped = percentage.clamp(0.0, 100.0);
        let filled = (((clamped / 100.0) * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
        let bar = format!(
            "[{}{}]",
            PROGRESS_FULL.repeat(filled),
            PROGRESS_EMPTY.repeat(BAR_WIDTH - filled)
        );
        self.paint(&bar, tone)
    }

    fn velocity_label(&self, velocity: Velocity) -> String {
        let tone = match velocity {
            Velocity::Slow | Velocity::Normal => Tone::Good,
            Velocity::Fast => Tone::Warning,
            Velocity::VeryFast => Tone::Critical,
        };
        self.paint(velocity.label(), tone)
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.colored_output {
            return text.to_string();
        }
        self.theme.paint(text, tone)
    }
}

/// Status line text for an active session
fn status_message(view: &ViewModel) -> (&'static str, Tone) {
    let depletes_early = view
        .prediction
        .as_ref()
        .is_some_and(|p| p.will_deplete_before_reset);
    if view.tokens_used() > view.token_limit() {
        ("Tokens exceeded the limit!", Tone::Critical)
    } else if depletes_early {
        ("Tokens will run out before reset", Tone::Warning)
    } else {
        ("Smooth sailing...", Tone::Good)
    }
}

fn usage_tone(percentage: f64) -> Tone {
    if percentage >= USAGE_CRITICAL_THRESHOLD {
        Tone::Critical
    } else if percentage >= USAGE_WARNING_THRESHOLD {
        Tone::Warning
    } else {
        Tone::Good
    }
}

/// Get terminal width using the cross-platform terminal_size crate
fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(width, _)| width.0 as usize)
}

impl fmt::Display for MonitorDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonitorDisplay(width: {}, theme: {})", self.width, self.theme)
    }
}
