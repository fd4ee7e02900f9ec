//! LLM-backed training plan generator with a feedback memory loop.
//!
//! `coach-rs` turns an [`AthleteProfile`](profile::AthleteProfile) into a
//! natural-language coaching prompt, sends it to an OpenAI-compatible
//! chat-completions endpoint ([OpenRouter](https://openrouter.ai/) by
//! default), and returns the generated plan text untouched. Plans the athlete
//! has commented on are kept in a small history log; the two most recent
//! (plan, feedback) pairs are folded into the next prompt.
//!
//! # Getting started
//!
//! ```ignore
//! use coach_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoachConfig::default();
//!     let client = config.build_client()?;
//!     let history = JsonFileHistory::new("history.json");
//!
//!     let profile = AthleteProfile {
//!         goals: "first strict muscle-up".into(),
//!         age: Some(30),
//!         ..Default::default()
//!     };
//!
//!     let coach = Coach::new(&client, &history, config.generation_params());
//!     let step = coach.generate(CoachSession::new(), &profile).await;
//!     if let Some(plan) = step.session.plan() {
//!         println!("{plan}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Profile input:** [`profile`]: [`AthleteProfile`](profile::AthleteProfile),
//!   ordered [`Availability`](profile::Availability) with the enumerated
//!   [`AvailabilityStatus`](profile::AvailabilityStatus), and the clamped
//!   program form used by the terminal UI.
//! - **Prompt text:** [`prompt::build_prompt`]: pure rendering of profile and
//!   recent history.
//! - **Talking to the model:** [`OpenRouterClient`] implements
//!   [`CompletionOracle`](api::CompletionOracle); tests swap in stubs.
//! - **Memory:** [`history`]: the [`HistoryLog`](history::HistoryLog) trait,
//!   an atomically-rewritten JSON file store, and an in-memory store.
//! - **Interaction loop:** [`session`]: the explicit
//!   `Idle → PlanGenerated → Idle` state machine.
//! - **Frontends:** [`ui`] holds the shared state the terminal UI renders
//!   plus a tracing layer that feeds its log pane.

pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod prelude;
pub mod profile;
pub mod prompt;
pub mod session;
pub mod ui;

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use crate::api::tracing::{CostTracker, generate_trace_id, pricing_for_model};
use crate::api::{CompletionFuture, CompletionOracle, GenerationParams};
use crate::error::CompletionError;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENROUTER_KEY";

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// A request carrying `prompt` as the single user message.
    pub fn for_prompt(prompt: &str, params: &GenerationParams) -> Self {
        Self {
            model: params.model.clone(),
            messages: vec![Message::user(prompt)],
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        }
    }
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`OpenRouterClient::chat()`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-compatible chat completions API.
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    referer: String,
    title: String,
    usage: Mutex<CostTracker>,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenRouterClient {
    /// Create a new client with the given API key and default headers.
    pub fn new(api_key: impl Into<String>) -> Result<Self, CompletionError> {
        Self::with_headers(api_key, "https://github.com/hybrid-coach", "hybrid-coach")
    }

    /// Create a client from the [`API_KEY_ENV`] environment variable.
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| CompletionError::MissingCredential(API_KEY_ENV))?;
        Self::new(api_key)
    }

    /// Create a new client with custom Referer and X-Title headers.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .user_agent("hybrid-coach/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CompletionError::ClientBuild(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: OPENROUTER_URL.to_string(),
            referer: referer.into(),
            title: title.into(),
            usage: Mutex::new(CostTracker::new()),
        })
    }

    /// Point the client at a different chat-completions URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// The chat-completions URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Summary of tokens and estimated spend across every call so far.
    pub fn usage_summary(&self) -> String {
        self.usage
            .lock()
            .map(|u| u.summary())
            .unwrap_or_else(|e| e.into_inner().summary())
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, CompletionError> {
        let trace_id = generate_trace_id();
        debug!(
            "LLM request [{}]: model={}, messages={}, max_tokens={}, temp={}",
            trace_id,
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| CompletionError::Transport(format!("failed to read response: {e}")))?;

        debug!(
            "LLM response [{}]: HTTP {} in {:.1}s ({} bytes)",
            trace_id,
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::Decode(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(CompletionError::Api(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            let prompt_tokens = usage.prompt_tokens.unwrap_or(0);
            let completion_tokens = usage.completion_tokens.unwrap_or(0);
            debug!(
                "Token usage [{}]: prompt={}, completion={}, total={}",
                trace_id,
                prompt_tokens,
                completion_tokens,
                usage.total_tokens.unwrap_or(0),
            );
            if let Ok(mut tracker) = self.usage.lock() {
                tracker.record(
                    prompt_tokens,
                    completion_tokens,
                    &pricing_for_model(&body.model),
                );
            }
        }

        let choice = parsed.choices.and_then(|c| c.into_iter().next());
        match choice {
            Some(c) => {
                debug!(
                    "LLM output [{}]: {} chars, finish_reason={}",
                    trace_id,
                    c.message.content.as_ref().map_or(0, |s| s.len()),
                    c.finish_reason.as_deref().unwrap_or("(none)"),
                );
                Ok(ChatCompletion {
                    content: c.message.content,
                    usage: parsed.usage,
                    finish_reason: c.finish_reason,
                })
            }
            None => {
                debug!("LLM output [{}]: empty (no choices)", trace_id);
                Ok(ChatCompletion {
                    content: None,
                    usage: parsed.usage,
                    finish_reason: None,
                })
            }
        }
    }
}

impl CompletionOracle for OpenRouterClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> CompletionFuture<'a> {
        Box::pin(async move {
            let body = ChatRequest::for_prompt(prompt, params);
            let completion = self.chat(&body).await?;
            let text = completion.content.ok_or(CompletionError::EmptyResponse)?;
            info!("Plan generated: {} chars with {}", text.len(), params.model);
            Ok(text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

    fn params() -> GenerationParams {
        GenerationParams::new("openai/gpt-4o-mini", 2000, 0.7)
    }

    fn client_for(server: &mockito::ServerGuard) -> OpenRouterClient {
        OpenRouterClient::new("test-key")
            .unwrap()
            .with_api_url(format!("{}{COMPLETIONS_PATH}", server.url()))
    }

    #[test]
    fn chat_request_for_prompt_carries_params() {
        let req = ChatRequest::for_prompt("hello", &params());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "openai/gpt-4o-mini");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = OpenRouterClient::new("secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }

    #[tokio::test]
    async fn complete_returns_first_choice_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COMPLETIONS_PATH)
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "openai/gpt-4o-mini",
                "max_tokens": 2000,
                "messages": [{"role": "user", "content": "build me a plan"}],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [
                        {"message": {"content": "  Week 1:\n- squat\n"}, "finish_reason": "stop"},
                        {"message": {"content": "ignored"}, "finish_reason": "stop"}
                    ],
                    "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let text = client.complete("build me a plan", &params()).await.unwrap();

        assert_eq!(text, "  Week 1:\n- squat\n");
        assert!(client.usage_summary().contains("160 total"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn identical_prompts_are_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"plan"}}]}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        client.complete("same", &params()).await.unwrap();
        client.complete("same", &params()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.complete("p", &params()).await.unwrap_err();
        match err {
            CompletionError::Http { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_object_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(200)
            .with_body(r#"{"error": {"message": "quota exceeded"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.complete("p", &params()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Api(ref m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn missing_choices_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.complete("p", &params()).await.unwrap_err();
        assert!(matches!(err, CompletionError::EmptyResponse));
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", COMPLETIONS_PATH)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.complete("p", &params()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let client = OpenRouterClient::new("test-key")
            .unwrap()
            .with_api_url("http://127.0.0.1:1/chat/completions");
        let err = client.complete("p", &params()).await.unwrap_err();
        assert!(matches!(err, CompletionError::Transport(_)));
    }
}
