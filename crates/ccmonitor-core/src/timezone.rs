//! Display timezone
//!
//! The engine works in UTC throughout. Only the renderers convert instants
//! (predicted end, reset time, the status clock) into the display timezone
//! chosen on the command line or detected from the system.

use crate::error::{CcmonitorError, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

/// Timezone used for rendering instants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    pub tz: Tz,
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(get_local_timezone())
    }
}

impl TimezoneConfig {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            is_utc: tz == Tz::UTC,
        }
    }

    /// UTC display
    pub fn utc() -> Self {
        Self::new(Tz::UTC)
    }

    /// Build from `--timezone` / `--utc`; `--utc` wins
    pub fn from_cli(timezone: Option<&str>, use_utc: bool) -> Result<Self> {
        if use_utc {
            return Ok(Self::utc());
        }

        match timezone {
            Some(name) => Tz::from_str(name.trim()).map(Self::new).map_err(|_| {
                CcmonitorError::InvalidTimezone(format!(
                    "'{}'. Use an IANA name like 'Europe/Warsaw', 'America/New_York' or 'UTC'",
                    name
                ))
            }),
            None => Ok(Self::default()),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Convert a UTC instant into the display timezone
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// `HH:MM` in the display timezone
    pub fn format_hm(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant).format("%H:%M").to_string()
    }

    /// `HH:MM:SS` in the display timezone
    pub fn format_hms(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant).format("%H:%M:%S").to_string()
    }
}

/// Detect the system timezone: `TZ`, then the OS setting, then UTC
pub fn get_local_timezone() -> Tz {
    #[allow(clippy::collapsible_if)]
    if let Ok(name) = std::env::var("TZ") {
        if let Ok(tz) = Tz::from_str(&name) {
            debug!("Using timezone from TZ: {}", name);
            return tz;
        }
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => Tz::from_str(&name).unwrap_or_else(|_| {
            debug!("Unknown system timezone '{}', using UTC", name);
            Tz::UTC
        }),
        Err(e) => {
            debug!("Could not detect system timezone: {:?}, using UTC", e);
            Tz::UTC
        }
    }
}
