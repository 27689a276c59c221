//! Color themes for light and dark terminal backgrounds

use ccmonitor_core::error::CcmonitorError;
use colored::{Color, Colorize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Semantic color of a piece of output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Good,
    Warning,
    Critical,
    Muted,
}

/// Terminal background the colors are picked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Detect from the terminal, dark when unknown
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Resolve `Auto` to a concrete theme from `COLORFGBG`
    pub fn resolve(self) -> Self {
        if self != Self::Auto {
            return self;
        }
        let detected = std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or(Self::Dark);
        debug!("Detected {} terminal theme", detected);
        detected
    }

    /// Theme from a `COLORFGBG` value such as `15;0`
    ///
    /// The last field is the background color index.
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(match background {
            7 | 9..=15 => Self::Light,
            _ => Self::Dark,
        })
    }

    pub(crate) fn color(&self, tone: Tone) -> Color {
        match (self, tone) {
            (Self::Light, Tone::Good) => Color::Green,
            (Self::Light, Tone::Warning) => Color::Magenta,
            (Self::Light, Tone::Critical) => Color::Red,
            (Self::Light, Tone::Muted) => Color::Blue,
            (_, Tone::Good) => Color::BrightGreen,
            (_, Tone::Warning) => Color::BrightYellow,
            (_, Tone::Critical) => Color::BrightRed,
            (_, Tone::Muted) => Color::BrightCyan,
        }
    }

    pub(crate) fn paint(&self, text: &str, tone: Tone) -> String {
        text.color(self.color(tone)).to_string()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CcmonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(CcmonitorError::InvalidArgument(format!(
                "unknown theme '{other}', expected auto, light or dark"
            ))),
        }
    }
}
