//! The text-completion oracle seam.
//!
//! Everything that turns a prompt into a plan goes through
//! [`CompletionOracle`]. The trait returns a boxed future so it stays
//! dyn-compatible and can be shared as `Arc<dyn CompletionOracle>` across
//! axum handlers.

use std::future::Future;
use std::pin::Pin;

use crate::error::CompletionError;

/// Boxed future returned by [`CompletionOracle::complete`].
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, CompletionError>> + Send + 'a>>;

/// Generation parameters sent with every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Model identifier, e.g. `"openai/gpt-4o-mini"`.
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            temperature,
        }
    }
}

/// A text-completion oracle: prompt in, generated text (or a typed failure)
/// out.
///
/// Implementations issue exactly one request per call. They must not retry,
/// fall back to another model, or cache responses.
pub trait CompletionOracle: Send + Sync {
    /// Complete `prompt` and return the first candidate's text verbatim.
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> CompletionFuture<'a>;
}

/// Type-erased synchronous handler for [`FnOracle`].
type OracleHandler =
    Box<dyn Fn(&str, &GenerationParams) -> Result<String, CompletionError> + Send + Sync>;

/// A closure-backed oracle.
///
/// Handy for offline runs and tests: the closure sees the exact prompt and
/// parameters that would have been sent.
///
/// ```
/// use coach_rs::api::{CompletionOracle, FnOracle, GenerationParams};
///
/// let oracle = FnOracle::new(|prompt, _params| Ok(format!("echo: {}", prompt.len())));
/// let params = GenerationParams::new("test", 100, 0.7);
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let text = rt.block_on(oracle.complete("hello", &params)).unwrap();
/// assert_eq!(text, "echo: 5");
/// ```
pub struct FnOracle {
    handler: OracleHandler,
}

impl FnOracle {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &GenerationParams) -> Result<String, CompletionError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }
}

impl CompletionOracle for FnOracle {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> CompletionFuture<'a> {
        let result = (self.handler)(prompt, params);
        Box::pin(async move { result })
    }
}
