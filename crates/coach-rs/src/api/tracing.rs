//! Request correlation IDs and token/cost accounting.
//!
//! Every completion request gets a `trace_id` that prefixes its debug log
//! lines. Token usage reported by the API is folded into a [`CostTracker`]
//! so the CLI can print what a run spent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Generate a unique trace ID for one completion request.
pub fn generate_trace_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("gen-{ts:x}-{count:04x}")
}

/// Per-model pricing for cost estimation (USD per 1M tokens).
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Estimate cost for given token counts.
    pub fn estimate_cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        (prompt_tokens as f64 / 1_000_000.0) * self.input_per_million
            + (completion_tokens as f64 / 1_000_000.0) * self.output_per_million
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self::new(3.0, 15.0)
    }
}

/// Approximate list prices, most specific needle first.
const PRICING_TABLE: &[(&str, ModelPricing)] = &[
    ("gpt-4o-mini", ModelPricing::new(0.15, 0.60)),
    ("gpt-4o", ModelPricing::new(2.50, 10.0)),
    ("gpt-4.1-mini", ModelPricing::new(0.40, 1.60)),
    ("gpt-4", ModelPricing::new(2.50, 10.0)),
    ("haiku", ModelPricing::new(0.25, 1.25)),
    ("sonnet", ModelPricing::new(3.0, 15.0)),
    ("opus", ModelPricing::new(15.0, 75.0)),
    ("flash", ModelPricing::new(0.075, 0.30)),
    ("gemini", ModelPricing::new(1.25, 5.0)),
    ("deepseek", ModelPricing::new(0.27, 1.10)),
];

/// Lookup approximate pricing for a model by name.
///
/// Only the segment after the last `/` is matched, so
/// `"openai/gpt-4o-mini"` and `"gpt-4o-mini"` price the same.
pub fn pricing_for_model(model: &str) -> ModelPricing {
    let name = model.rsplit('/').next().unwrap_or(model).to_lowercase();
    PRICING_TABLE
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|(_, pricing)| pricing.clone())
        .unwrap_or_default()
}

/// Cumulative token and cost tracker.
#[derive(Debug, Default)]
pub struct CostTracker {
    pub requests: u64,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub estimated_cost_usd: f64,
}

impl CostTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage for one request.
    pub fn record(&mut self, prompt_tokens: u32, completion_tokens: u32, pricing: &ModelPricing) {
        self.requests += 1;
        self.total_prompt_tokens += prompt_tokens as u64;
        self.total_completion_tokens += completion_tokens as u64;
        self.estimated_cost_usd += pricing.estimate_cost(prompt_tokens, completion_tokens);
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_prompt_tokens + self.total_completion_tokens
    }

    /// Format as a short summary string.
    pub fn summary(&self) -> String {
        format!(
            "requests: {}, tokens: {} prompt + {} completion = {} total, est. cost: ${:.4}",
            self.requests,
            self.total_prompt_tokens,
            self.total_completion_tokens,
            self.total_tokens(),
            self.estimated_cost_usd,
        )
    }
}
