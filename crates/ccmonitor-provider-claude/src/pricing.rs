//! Built-in per-family model pricing
//!
//! Claude Code logs usually carry a pre-computed `costUSD`. When they do not,
//! the cost is derived from the token counts and a small table keyed by model
//! family. Models outside the table cost nothing.

use ccmonitor_core::types::{ModelName, TokenCounts};
use tracing::trace;

/// Per-token prices in USD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_cost_per_token: f64,
    pub output_cost_per_token: f64,
    pub cache_creation_input_token_cost: f64,
    pub cache_read_input_token_cost: f64,
}

impl ModelPricing {
    /// Build from prices per million tokens
    const fn per_million(input: f64, output: f64, cache_creation: f64, cache_read: f64) -> Self {
        Self {
            input_cost_per_token: input / 1_000_000.0,
            output_cost_per_token: output / 1_000_000.0,
            cache_creation_input_token_cost: cache_creation / 1_000_000.0,
            cache_read_input_token_cost: cache_read / 1_000_000.0,
        }
    }
}

const OPUS: ModelPricing = ModelPricing::per_million(15.0, 75.0, 18.75, 1.5);
const SONNET: ModelPricing = ModelPricing::per_million(3.0, 15.0, 3.75, 0.3);
const HAIKU: ModelPricing = ModelPricing::per_million(0.25, 1.25, 0.3, 0.03);

/// Pricing for a model, matched on its family name
pub fn pricing_for(model: &ModelName) -> Option<ModelPricing> {
    let name = model.as_str().to_lowercase();
    if name.contains("opus") {
        Some(OPUS)
    } else if name.contains("sonnet") {
        Some(SONNET)
    } else if name.contains("haiku") {
        Some(HAIKU)
    } else {
        None
    }
}

/// Cost of `tokens` under `pricing`
pub fn calculate_from_pricing(tokens: &TokenCounts, pricing: &ModelPricing) -> f64 {
    tokens.input_tokens as f64 * pricing.input_cost_per_token
        + tokens.output_tokens as f64 * pricing.output_cost_per_token
        + tokens.cache_creation_tokens as f64 * pricing.cache_creation_input_token_cost
        + tokens.cache_read_tokens as f64 * pricing.cache_read_input_token_cost
}

/// Cost of `tokens` on `model`, 0 for unknown models
pub fn estimate_cost(tokens: &TokenCounts, model: &ModelName) -> f64 {
    match pricing_for(model) {
        Some(pricing) => calculate_from_pricing(tokens, &pricing),
        None => {
            trace!("No built-in pricing for model {}", model);
            0.0
        }
    }
}
