//! Subscription plans and their nominal token limits

use crate::error::CcmonitorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nominal token limit of the Pro plan per 5-hour block
pub const PRO_TOKEN_LIMIT: u64 = 44_000;
/// Nominal token limit of the Max (5x) plan per 5-hour block
pub const MAX5_TOKEN_LIMIT: u64 = 220_000;
/// Nominal token limit of the Max (20x) plan per 5-hour block
pub const MAX20_TOKEN_LIMIT: u64 = 880_000;

/// Plan identifier
///
/// # Examples
/// ```
/// use ccmonitor_core::plan::PlanName;
/// use std::str::FromStr;
///
/// assert_eq!(PlanName::from_str("max5").unwrap(), PlanName::Max5);
/// assert_eq!(PlanName::CustomMax.to_string(), "custom_max");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanName {
    /// Claude Pro
    #[default]
    Pro,
    /// Claude Max, 5x usage
    Max5,
    /// Claude Max, 20x usage
    Max20,
    /// Limit derived from the highest completed block
    CustomMax,
}

impl PlanName {
    /// Nominal limit, `None` for [`PlanName::CustomMax`]
    pub fn nominal_limit(&self) -> Option<u64> {
        match self {
            Self::Pro => Some(PRO_TOKEN_LIMIT),
            Self::Max5 => Some(MAX5_TOKEN_LIMIT),
            Self::Max20 => Some(MAX20_TOKEN_LIMIT),
            Self::CustomMax => None,
        }
    }

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Max5 => "max5",
            Self::Max20 => "max20",
            Self::CustomMax => "custom_max",
        }
    }
}

impl fmt::Display for PlanName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanName {
    type Err = CcmonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pro" => Ok(Self::Pro),
            "max5" => Ok(Self::Max5),
            "max20" => Ok(Self::Max20),
            "custom_max" | "custom-max" => Ok(Self::CustomMax),
            _ => Err(CcmonitorError::InvalidPlan(s.to_string())),
        }
    }
}

/// A plan together with its token limit
///
/// The limit of a `custom_max` plan stays unresolved until the limit
/// detector has looked at the block history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier
    pub name: PlanName,
    /// Token limit per block, `None` while unresolved
    pub token_limit: Option<u64>,
}

impl Plan {
    /// Plan with its nominal limit
    pub fn new(name: PlanName) -> Self {
        Self {
            name,
            token_limit: name.nominal_limit(),
        }
    }

    /// The Pro plan
    pub fn pro() -> Self {
        Self::new(PlanName::Pro)
    }

    /// A `custom_max` plan with a resolved limit
    pub fn custom_max(token_limit: u64) -> Self {
        Self {
            name: PlanName::CustomMax,
            token_limit: Some(token_limit),
        }
    }

    /// Whether this plan derives its limit from history
    pub fn is_custom_max(&self) -> bool {
        self.name == PlanName::CustomMax
    }

    /// Resolved limit, or the Pro limit while unresolved
    pub fn limit_or_default(&self) -> u64 {
        self.token_limit.unwrap_or(PRO_TOKEN_LIMIT)
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::pro()
    }
}

impl From<PlanName> for Plan {
    fn from(name: PlanName) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token_limit {
            Some(limit) => write!(f, "{} ({limit} tokens)", self.name),
            None => write!(f, "{} (unresolved)", self.name),
        }
    }
}
