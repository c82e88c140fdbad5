//! `config` subcommand: show resolved configuration.
//!
//! Prints the configuration with secrets redacted, either as JSON
//! (`--json`) or as a human-readable key = value table.

use std::path::PathBuf;

use crate::cli::ConfigArgs;
use crate::config::{BridgeConfig, resolve_config};

/// Run the `config` subcommand.
///
/// # Errors
///
/// Returns an error if config resolution fails (e.g. unreadable TOML file).
pub async fn run(config_path: &Option<PathBuf>, args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(config_path.as_deref())?.redacted();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
    } else {
        print!("{}", render_table(&cfg));
    }
    Ok(())
}

fn render_table(cfg: &BridgeConfig) -> String {
    let unset = |v: &Option<String>| v.clone().unwrap_or_else(|| "<unset>".to_string());
    let transport = match cfg.transport {
        crate::config::TransportKind::Stdio => "stdio",
        crate::config::TransportKind::Http => "http",
    };
    let mut out = String::from("pm-bridge-mcp configuration:\n");
    out.push_str(&format!("  base_url             = {}\n", unset(&cfg.base_url)));
    out.push_str(&format!("  api_key              = {}\n", unset(&cfg.api_key)));
    out.push_str(&format!("  attachment_token     = {}\n", unset(&cfg.attachment_token)));
    out.push_str(&format!("  request_timeout_secs = {}\n", cfg.request_timeout_secs));
    out.push_str(&format!("  fetch_timeout_secs   = {}\n", cfg.fetch_timeout_secs));
    out.push_str(&format!("  transport            = {transport}\n"));
    out.push_str(&format!("  http_addr            = {}\n", cfg.http_addr));
    out
}
