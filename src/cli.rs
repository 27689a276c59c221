//! CLI interface for ccmonitor
//!
//! A single flat command: the monitor runs until Ctrl+C unless `--once` or
//! `--json` asks for a single snapshot.
//!
//! # Example
//!
//! ```bash
//! # Live full-screen monitor for a Max (5x) plan
//! ccmonitor --plan max5
//!
//! # One compact line in Tokyo time, then exit
//! ccmonitor --compact --once --timezone Asia/Tokyo
//!
//! # Machine-readable snapshot with a detected limit
//! ccmonitor --plan custom_max --json
//! ```

use ccmonitor_core::error::{CcmonitorError, Result};
use ccmonitor_core::{Plan, PlanName, TimezoneConfig};
use ccmonitor_terminal::{CompactFields, Theme};
use clap::Parser;

/// Default refresh interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 3;

/// Live monitor for Claude Code token usage in 5-hour session blocks
#[derive(Parser, Debug, Clone)]
#[command(name = "ccmonitor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subscription plan: pro, max5, max20 or custom_max
    #[arg(long, short = 'p', env = "CCMONITOR_PLAN", default_value = "pro", value_parser = parse_plan)]
    pub plan: PlanName,

    /// Display timezone (e.g. "Europe/Warsaw", "America/New_York", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', env = "CCMONITOR_TIMEZONE")]
    pub timezone: Option<String>,

    /// Display times in UTC (overrides --timezone)
    #[arg(long)]
    pub utc: bool,

    /// Single-line display
    #[arg(long, short = 'c')]
    pub compact: bool,

    /// Fields on the compact line, comma separated: tokens, percentage,
    /// burn_rate, predicted_end, reset_time, current_time, time_remaining,
    /// cost, plan_info
    #[arg(long, value_parser = parse_compact_fields)]
    pub compact_fields: Option<CompactFields>,

    /// Color theme: auto, light or dark
    #[arg(long, env = "CCMONITOR_THEME", default_value = "auto", value_parser = parse_theme)]
    pub theme: Theme,

    /// Refresh interval in seconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS, value_parser = parse_interval)]
    pub interval: u64,

    /// Run one cycle, print it and exit
    #[arg(long)]
    pub once: bool,

    /// Print one cycle as JSON and exit (implies --once)
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show informational logs on stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// The configured plan with its nominal limit
    pub fn plan(&self) -> Plan {
        Plan::new(self.plan)
    }

    /// Resolve `--timezone` / `--utc`
    pub fn timezone_config(&self) -> Result<TimezoneConfig> {
        TimezoneConfig::from_cli(self.timezone.as_deref(), self.utc)
    }

    /// Whether a single snapshot was requested
    pub fn is_snapshot(&self) -> bool {
        self.once || self.json
    }
}

/// Parse a plan name
pub fn parse_plan(value: &str) -> Result<PlanName> {
    value.parse()
}

/// Parse a comma separated compact field list
pub fn parse_compact_fields(value: &str) -> Result<CompactFields> {
    value.parse()
}

/// Parse a color theme name
pub fn parse_theme(value: &str) -> Result<Theme> {
    value.parse()
}

/// Parse a refresh interval, at least one second
pub fn parse_interval(value: &str) -> Result<u64> {
    let secs = value.trim().parse::<u64>().map_err(|_| {
        CcmonitorError::InvalidArgument(format!("interval must be a whole number of seconds, got '{value}'"))
    })?;
    if secs == 0 {
        return Err(CcmonitorError::InvalidArgument(
            "interval must be at least 1 second".to_string(),
        ));
    }
    Ok(secs)
}
