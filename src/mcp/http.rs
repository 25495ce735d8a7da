//! Streamable-HTTP transport
//!
//! Stateless: every `POST /mcp` carries one JSON-RPC message and gets a JSON
//! answer (or `202 Accepted` for notifications). No session is issued.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::config::parallel::API_KEY_HEADER;
use crate::error::{McpError, Result};
use crate::mcp::server::{McpServer, SERVER_NAME};
use crate::mcp::tools::CallContext;

/// Create the application router
pub fn create_router(server: McpServer) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(health))
        .with_state(Arc::new(server))
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: &str, server: McpServer) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting server on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| McpError::TransportError {
            message: e.to_string(),
        })?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let ctx = CallContext {
        api_key_header: headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    match server.handle_message(&body, &ctx).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Liveness probe
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME
    }))
}
