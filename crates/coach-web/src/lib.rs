//! HTTP API for the hybrid coach.
//!
//! `coach-web` exposes the plan generator over a small axum server:
//!
//! | Route            | Purpose                                           |
//! |------------------|---------------------------------------------------|
//! | `POST /generate` | profile in, `{"plan"}` or `{"error"}` out         |
//! | `POST /feedback` | store `{"plan","feedback"}` in the history log    |
//! | `GET /history`   | the stored plan/feedback pairs, oldest first      |
//! | `GET /health`    | liveness probe                                    |
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use coach_rs::prelude::*;
//! use coach_web::{WebConfig, spawn_web};
//!
//! let config = CoachConfig::default();
//! let oracle: Arc<dyn CompletionOracle> = Arc::new(config.build_client()?);
//! let history: Arc<dyn HistoryLog> = Arc::new(JsonFileHistory::new("history.json"));
//!
//! let addr = spawn_web(oracle, history, WebConfig::default()).await?;
//! println!("Listening on http://{addr}");
//! ```

mod api;
mod server;

pub use api::{FeedbackRequest, GenerateRequest, GenerateResponse};
pub use server::{build_router, start_server};

use std::net::SocketAddr;
use std::sync::Arc;

use coach_rs::api::{CompletionOracle, GenerationParams};
use coach_rs::config::CoachConfig;
use coach_rs::history::HistoryLog;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8000`.
    pub bind_addr: SocketAddr,
    /// Model knobs sent with every generation.
    pub params: GenerationParams,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            params: CoachConfig::default().generation_params(),
        }
    }
}

/// Bind the server and serve it on a Tokio task.
///
/// Returns the bound address (useful with port 0). The server runs until
/// the Tokio runtime shuts down.
pub async fn spawn_web(
    oracle: Arc<dyn CompletionOracle>,
    history: Arc<dyn HistoryLog>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let router = build_router(oracle, history, config.params);
    start_server(router, config.bind_addr).await
}
