//! pm-bridge-mcp: MCP server for a project-management admin API.
//!
//! # Subcommands
//!
//! - `serve`  : Start the MCP server (stdio or HTTP)
//! - `config` : Show resolved configuration

use clap::Parser;
use pm_bridge_core::logging;

use pm_bridge_mcp::cli::{Cli, Commands};
use pm_bridge_mcp::commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(&cli.config, args).await,
        Commands::Config(args) => commands::config_cmd::run(&cli.config, args).await,
    }
}
