//! API interaction layer: the completion oracle seam and usage tracking.
//!
//! - [`oracle`]: the [`CompletionOracle`] trait every generation goes
//!   through, its [`GenerationParams`], and the closure-backed [`FnOracle`].
//!   [`OpenRouterClient`](crate::OpenRouterClient) is the production
//!   implementation.
//! - [`tracing`]: per-request trace IDs, per-model pricing tables, and the
//!   cumulative [`CostTracker`].

pub mod oracle;
pub mod tracing;

pub use oracle::{CompletionFuture, CompletionOracle, FnOracle, GenerationParams};
pub use tracing::{CostTracker, generate_trace_id, pricing_for_model};
