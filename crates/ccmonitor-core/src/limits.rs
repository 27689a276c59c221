//! Limit detection and automatic plan escalation
//!
//! A `custom_max` plan takes its limit from the busiest completed block in
//! the history. A fixed plan switches to `custom_max` the first time the
//! active block goes over its nominal limit; the switch is a one-shot
//! transition that stays in effect for the rest of the process run.

use crate::blocks::SessionBlocks;
use crate::plan::{PRO_TOKEN_LIMIT, Plan};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of one limit resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitResolution {
    /// Plan in effect with a resolved limit
    pub effective_plan: Plan,
    /// True only on the cycle the plan switched to `custom_max`
    pub escalated_now: bool,
    /// `custom_max` had no completed history and used the Pro limit
    pub fell_back: bool,
}

impl LimitResolution {
    /// The resolved token limit
    pub fn token_limit(&self) -> u64 {
        self.effective_plan.limit_or_default()
    }
}

/// Resolves the effective token limit, remembering a plan escalation
#[derive(Debug, Clone, Default)]
pub struct LimitDetector {
    escalated: bool,
}

impl LimitDetector {
    /// Detector with no escalation recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the configured plan has been switched to `custom_max`
    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// Resolve the limit for `plan` against the current block history
    pub fn resolve(&mut self, blocks: &SessionBlocks, plan: &Plan) -> LimitResolution {
        let mut escalated_now = false;

        if !plan.is_custom_max() && !self.escalated {
            let nominal = plan.limit_or_default();
            let used = blocks.active().map(|b| b.total_tokens()).unwrap_or(0);
            if used > nominal {
                info!(
                    "Active block used {} tokens, above the {} limit of {}; switching to custom_max",
                    used, plan.name, nominal
                );
                self.escalated = true;
                escalated_now = true;
            }
        }

        if plan.is_custom_max() || self.escalated {
            let (limit, fell_back) = match max_completed_tokens(blocks) {
                Some(max) if max > 0 => (max, false),
                _ => {
                    debug!("No completed blocks to size custom_max, using the Pro limit");
                    (PRO_TOKEN_LIMIT, true)
                }
            };
            return LimitResolution {
                effective_plan: Plan::custom_max(limit),
                escalated_now,
                fell_back,
            };
        }

        LimitResolution {
            effective_plan: Plan {
                name: plan.name,
                token_limit: Some(plan.limit_or_default()),
            },
            escalated_now,
            fell_back: false,
        }
    }
}

/// Highest token total over completed blocks
///
/// The active block is excluded since it is still growing. Ties do not
/// matter, only the value is returned.
pub fn max_completed_tokens(blocks: &SessionBlocks) -> Option<u64> {
    blocks.completed().map(|b| b.total_tokens()).max()
}
