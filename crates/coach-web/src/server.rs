//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use coach_rs::api::{CompletionOracle, GenerationParams};
use coach_rs::history::HistoryLog;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::{self, AppState};

/// Build the router with every route and a permissive CORS layer.
pub fn build_router(
    oracle: Arc<dyn CompletionOracle>,
    history: Arc<dyn HistoryLog>,
    params: GenerationParams,
) -> Router {
    let state = AppState {
        oracle,
        history,
        params,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(api::post_generate))
        .route("/feedback", post(api::post_feedback))
        .route("/history", get(api::get_history))
        .route("/health", get(api::get_health))
        .with_state(state)
        .layer(cors)
}

/// Bind `bind_addr`, serve `router` on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("Coach API listening on http://{addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Server stopped: {e}");
        }
    });

    Ok(addr)
}
