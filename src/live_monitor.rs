//! Polling loop for ccmonitor
//!
//! Every tick re-reads the whole usage history from the source, runs one
//! [`Monitor`] cycle and redraws the screen. The core has no timers of its
//! own; the schedule lives here. A failing source shows the error screen and
//! the loop keeps going, so a transient read error never ends the session.
//! That includes starting before Claude Code has created its data directory.

use ccmonitor_core::error::{CcmonitorError, Result};
use ccmonitor_core::provider::UsageSource;
use ccmonitor_core::{Monitor, Plan, ViewModel};
use ccmonitor_terminal::{CompactFormatter, MonitorDisplay};
use chrono::{DateTime, Utc};
use console::Term;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

const ENTER_ALTERNATE_SCREEN: &str = "\x1b[?1049h";
const LEAVE_ALTERNATE_SCREEN: &str = "\x1b[?1049l";

/// How a cycle is drawn
pub enum Renderer {
    /// Boxed full-screen panel
    Full(MonitorDisplay),
    /// One status line plus notifications
    Compact(CompactFormatter),
}

impl Renderer {
    /// Draw a computed cycle
    pub fn render(&mut self, view: &ViewModel) -> String {
        match self {
            Self::Full(display) => display.render(view),
            Self::Compact(formatter) => formatter.format(view),
        }
    }

    /// Draw a source failure
    pub fn render_error(&self, error: &CcmonitorError, now: DateTime<Utc>) -> String {
        match self {
            Self::Full(display) => display.render_error(&error.to_string(), now),
            Self::Compact(_) => format!("Claude : usage data unavailable | {error}"),
        }
    }
}

/// Restores the terminal when the loop ends, however it ends
struct ScreenGuard {
    term: Term,
}

impl ScreenGuard {
    fn enter(term: Term) -> Result<Self> {
        term.write_str(ENTER_ALTERNATE_SCREEN)?;
        term.hide_cursor()?;
        Ok(Self { term })
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = self.term.show_cursor();
        let _ = self.term.write_str(LEAVE_ALTERNATE_SCREEN);
    }
}

/// Live monitoring state
pub struct LiveMonitor<S: UsageSource> {
    source: S,
    monitor: Monitor,
    renderer: Renderer,
    interval_secs: u64,
}

impl<S: UsageSource> LiveMonitor<S> {
    pub fn new(source: S, plan: Plan, renderer: Renderer, interval_secs: u64) -> Self {
        Self {
            source,
            monitor: Monitor::new(plan),
            renderer,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Load the history and run one cycle at `now`
    ///
    /// A source failure leaves the monitor state untouched.
    pub async fn tick_at(&mut self, now: DateTime<Utc>) -> Result<ViewModel> {
        let events = self.source.load_events().await?;
        debug!("Loaded {} events for cycle at {}", events.len(), now);
        let view = self.monitor.tick(events, now);

        for kind in &view.newly_fired_notifications {
            info!("Notification fired: {}", kind);
        }
        Ok(view)
    }

    /// Produce the frame for one cycle at `now`, never failing
    pub async fn frame_at(&mut self, now: DateTime<Utc>) -> String {
        match self.tick_at(now).await {
            Ok(view) => self.renderer.render(&view),
            Err(e) => {
                if e.is_data_unavailable() {
                    info!("Waiting for usage data: {}", e);
                } else {
                    warn!("Usage source failed: {}", e);
                }
                self.renderer.render_error(&e, now)
            }
        }
    }

    /// Run a single cycle and return its output, as JSON when asked
    pub async fn run_once(mut self, json: bool) -> Result<String> {
        let view = self.tick_at(Utc::now()).await?;
        if json {
            Ok(serde_json::to_string_pretty(&view)?)
        } else {
            Ok(self.renderer.render(&view))
        }
    }

    /// Start the live monitoring loop
    pub async fn run(mut self) -> Result<()> {
        let term = Term::stdout();
        let _screen = ScreenGuard::enter(term.clone())?;

        let mut interval = interval(Duration::from_secs(self.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Monitoring every {}s", self.interval_secs);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let frame = self.frame_at(Utc::now()).await;
                    term.clear_screen()?;
                    term.write_str(&frame)?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping monitor");
                    break;
                }
            }
        }

        Ok(())
    }
}
