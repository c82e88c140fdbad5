//! `serve` subcommand: start the MCP server.
//!
//! Builds the admin API client from the resolved configuration and runs the
//! selected transport. See [`crate::stdio`] and [`crate::http`].

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context as _;
use pm_bridge_core::ApiClient;

use crate::cli::ServeArgs;
use crate::config::{BridgeConfig, TransportKind, resolve_config};
use crate::server::McpServer;

/// Apply CLI argument overrides on top of the resolved configuration.
pub fn apply_overrides(config: &mut BridgeConfig, args: &ServeArgs) {
    if let Some(transport) = args.transport {
        config.transport = transport;
    }
    if let Some(ref addr) = args.http_addr {
        config.http_addr = addr.clone();
    }
    if let Some(secs) = args.request_timeout {
        config.request_timeout_secs = secs;
    }
}

/// Run the `serve` subcommand.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or invalid, the HTTP
/// address cannot be bound, or the stdio loop hits an I/O error.
pub async fn run(config_path: &Option<PathBuf>, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = resolve_config(config_path.as_deref())?;
    apply_overrides(&mut config, &args);

    let endpoint = config.endpoint().context("invalid endpoint configuration")?;
    let server = McpServer::new(ApiClient::new(endpoint)?);
    tracing::info!(
        base_url = %server.client().config().base_url(),
        transport = ?config.transport,
        "starting pm-bridge-mcp"
    );

    match config.transport {
        TransportKind::Stdio => {
            crate::stdio::run(server, tokio::io::stdin(), tokio::io::stdout()).await
        }
        TransportKind::Http => {
            let addr: SocketAddr = config
                .http_addr
                .parse()
                .with_context(|| format!("invalid http_addr '{}'", config.http_addr))?;
            crate::http::serve(server, addr).await
        }
    }
}
