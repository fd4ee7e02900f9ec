//! HTTP server for the hybrid coach.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run -p coach-web
//! OPENROUTER_KEY=sk-... cargo run -p coach-web -- --port 8080 --history history.json
//! ```
//!
//! ```bash
//! curl -s localhost:8000/generate -H 'content-type: application/json' -d '{
//!   "age": 30, "training_age": 5, "goals": "first muscle-up",
//!   "availability": {"Monday": "available", "Thursday": "available"},
//!   "equipment": "rings, barbell", "max_pullup": 12, "max_hspu": 4, "week": 1
//! }'
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use coach_rs::config::{CoachConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use coach_rs::prelude::*;
use coach_web::{WebConfig, spawn_web};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// HTTP API that turns athlete profiles into weekly training plans.
#[derive(Parser)]
#[command(name = "coach-web")]
struct Args {
    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: std::net::IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// LLM model to use.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens per generated plan.
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Sampling temperature.
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// OpenAI-compatible chat-completions URL (default: OpenRouter).
    #[arg(long)]
    api_url: Option<String>,

    /// Persist plan/feedback history to this file. Without it, history is
    /// kept in memory for the life of the process.
    #[arg(long)]
    history: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CoachConfig {
        model: args.model,
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        api_url: args.api_url,
        history_path: args.history,
    };

    let client = config.build_client().map_err(|e| e.to_string())?;
    let oracle: Arc<dyn CompletionOracle> = Arc::new(client);
    let history: Arc<dyn HistoryLog> = match &config.history_path {
        Some(path) => {
            info!("History file: {}", path.display());
            Arc::new(JsonFileHistory::new(path))
        }
        None => Arc::new(InMemoryHistory::new()),
    };

    let web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
        params: config.generation_params(),
    };
    let addr = spawn_web(oracle, history, web_config)
        .await
        .map_err(|e| format!("failed to bind {}:{}: {e}", args.host, args.port))?;
    println!("Coach API: http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to wait for Ctrl-C: {e}"))?;
    info!("Shutting down");
    Ok(())
}
