//! MCP HTTP Transport
//!
//! Streamable-HTTP flavor of the protocol: each POST to `/mcp` carries one
//! JSON-RPC request and returns its response. `/health` is a plain liveness
//! probe for orchestrators.

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use super::server::McpServer;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Build the HTTP router over a shared MCP server
pub fn build_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/health", get(health))
        .with_state(server)
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    Json(server.handle_request(request).await)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "server": "recall-mcp" }))
}

/// Bind and serve the HTTP transport until the process exits
pub async fn serve(server: Arc<McpServer>, host: &str, port: u16) -> std::io::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("MCP server listening on http://{addr}/mcp");
    axum::serve(listener, build_router(server)).await
}
