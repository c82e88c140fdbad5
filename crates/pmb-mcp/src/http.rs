//! HTTP transport: one JSON-RPC message per `POST /mcp`.

use std::net::SocketAddr;

use anyhow::Context as _;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;

use crate::server::McpServer;

pub const MCP_PATH: &str = "/mcp";

pub fn router(server: McpServer) -> Router {
    Router::new()
        .route(MCP_PATH, post(http_post))
        .with_state(server)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if binding fails or the server stops abnormally.
pub async fn serve(server: McpServer, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %addr, path = MCP_PATH, "starting MCP HTTP server");
    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn http_post(State(server): State<McpServer>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(resp) => {
            let body = serde_json::to_string(&resp).unwrap_or_else(|_| "{}".to_string());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}
