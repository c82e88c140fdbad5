//! CLI argument types for pm-bridge-mcp.
//!
//! Defines the top-level [`Cli`] struct and the subcommand [`Args`] using
//! clap's derive macros. Each subcommand maps to a module in [`crate::commands`].

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::TransportKind;

/// MCP server exposing project-management records as tools and resources
#[derive(Parser, Debug)]
#[command(name = "pm-bridge-mcp", version, about)]
pub struct Cli {
    /// Path to config.toml (default: ~/.config/pm-bridge/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server
    Serve(ServeArgs),
    /// Show resolved configuration
    Config(ConfigArgs),
}

/// Arguments for the `serve` subcommand
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Transport to serve on (overrides config/env)
    #[arg(long, value_enum)]
    pub transport: Option<TransportKind>,

    /// Listen address for the HTTP transport
    #[arg(long = "http-addr")]
    pub http_addr: Option<String>,

    /// Admin API request timeout in seconds
    #[arg(long = "request-timeout")]
    pub request_timeout: Option<u64>,
}

/// Arguments for the `config` subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print as JSON instead of a key = value table
    #[arg(long)]
    pub json: bool,
}
