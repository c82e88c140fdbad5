//! Config resolution for pm-bridge-mcp.
//!
//! Resolves [`BridgeConfig`] from multiple sources with the following priority
//! (highest to lowest):
//!
//! 1. CLI flags (applied by the caller after [`resolve_config`] returns)
//! 2. Environment variables (`PMB_*`)
//! 3. The explicit `--config` file, or `~/.config/pm-bridge/config.toml`
//! 4. Compiled-in defaults (via [`BridgeConfig::default`])

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use super::types::BridgeConfig;

/// Default config file location: `<config_dir>/pm-bridge/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pm-bridge").join("config.toml"))
}

/// Parse a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`BridgeConfig`].
pub fn load_file(path: &Path) -> anyhow::Result<BridgeConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Resolve the complete configuration.
///
/// An explicit `config_path` must exist. The default location is optional:
/// when it is missing the compiled-in defaults are used.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn resolve_config(config_path: Option<&Path>) -> anyhow::Result<BridgeConfig> {
    let mut cfg = match config_path {
        Some(path) => load_file(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => load_file(&path)?,
            _ => {
                tracing::debug!("no config file found; using defaults");
                BridgeConfig::default()
            }
        },
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Apply `PMB_*` environment variable overrides to `cfg`.
///
/// Empty string values are treated as "not set". Unparseable numbers and
/// transports are ignored with a warning.
fn apply_env_overrides(cfg: &mut BridgeConfig) {
    if let Some(v) = env_value("PMB_BASE_URL") {
        cfg.base_url = Some(v);
    }
    if let Some(v) = env_value("PMB_API_KEY") {
        cfg.api_key = Some(v);
    }
    if let Some(v) = env_value("PMB_ATTACHMENT_TOKEN") {
        cfg.attachment_token = Some(v);
    }
    if let Some(v) = env_value("PMB_REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(secs) => cfg.request_timeout_secs = secs,
            Err(_) => tracing::warn!("ignoring invalid PMB_REQUEST_TIMEOUT_SECS={v}"),
        }
    }
    if let Some(v) = env_value("PMB_FETCH_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(secs) => cfg.fetch_timeout_secs = secs,
            Err(_) => tracing::warn!("ignoring invalid PMB_FETCH_TIMEOUT_SECS={v}"),
        }
    }
    if let Some(v) = env_value("PMB_TRANSPORT") {
        match v.parse() {
            Ok(transport) => cfg.transport = transport,
            Err(e) => tracing::warn!("ignoring PMB_TRANSPORT: {e}"),
        }
    }
    if let Some(v) = env_value("PMB_HTTP_ADDR") {
        cfg.http_addr = v;
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
