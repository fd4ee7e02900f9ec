//! Generation settings shared by every frontend.
//!
//! [`CoachConfig`] holds the model knobs and the optional endpoint/history
//! overrides, and turns them into a [`GenerationParams`] and a ready
//! [`OpenRouterClient`].

use std::path::PathBuf;

use crate::OpenRouterClient;
use crate::api::GenerationParams;
use crate::error::CompletionError;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
/// Completion budget for the CLI and HTTP server.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Completion budget for the terminal UI.
pub const TUI_MAX_TOKENS: u32 = 1500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// History file used when a frontend enables history without a path.
pub const DEFAULT_HISTORY_PATH: &str = "history.json";

/// Settings for one coach process.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachConfig {
    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,
    /// Maximum tokens per plan. Default: [`DEFAULT_MAX_TOKENS`].
    pub max_tokens: u32,
    /// Sampling temperature. Default: [`DEFAULT_TEMPERATURE`].
    pub temperature: f32,
    /// Chat-completions URL override. `None` uses OpenRouter.
    pub api_url: Option<String>,
    /// Where plan/feedback history is kept. `None` disables the file store.
    pub history_path: Option<PathBuf>,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            api_url: None,
            history_path: None,
        }
    }
}

impl CoachConfig {
    /// Defaults tuned for the terminal UI (smaller completion budget).
    pub fn for_tui() -> Self {
        Self {
            max_tokens: TUI_MAX_TOKENS,
            ..Self::default()
        }
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::new(self.model.clone(), self.max_tokens, self.temperature)
    }

    /// Build a client from the `OPENROUTER_KEY` environment variable, pointed
    /// at [`api_url`](Self::api_url) when set.
    pub fn build_client(&self) -> Result<OpenRouterClient, CompletionError> {
        let client = OpenRouterClient::from_env()?;
        Ok(match &self.api_url {
            Some(url) => client.with_api_url(url.clone()),
            None => client,
        })
    }
}
