//! Configuration types for pm-bridge-mcp.
//!
//! [`BridgeConfig`] is deserialized from `config.toml`. Every field has a
//! default, so a partial or absent file still yields a complete value;
//! credentials are validated only when [`BridgeConfig::endpoint`] is called.

use std::time::Duration;

use pm_bridge_core::{ApiError, EndpointConfig};
use serde::{Deserialize, Serialize};

/// Server transport used to talk to the MCP client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`
    Http,
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown transport '{other}' (expected stdio or http)")),
        }
    }
}

/// Resolved bridge configuration.
///
/// # Example `config.toml`
///
/// ```toml
/// base_url = "https://acme.example.com"
/// api_key = "0123456789abcdef"
/// attachment_token = "files-token"
/// request_timeout_secs = 20
/// transport = "http"
/// http_addr = "127.0.0.1:8080"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Account base URL of the admin API
    #[serde(default)]
    pub base_url: Option<String>,

    /// Secret API key used to sign requests
    #[serde(default)]
    pub api_key: Option<String>,

    /// Bearer token sent when fetching remote attachments
    #[serde(default)]
    pub attachment_token: Option<String>,

    /// Admin API call timeout in seconds (default: `30`)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Remote attachment fetch timeout in seconds (default: `30`)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Server transport (default: `stdio`)
    #[serde(default)]
    pub transport: TransportKind,

    /// Listen address for the HTTP transport (default: `127.0.0.1:8080`)
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_http_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            attachment_token: None,
            request_timeout_secs: default_request_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            transport: TransportKind::default(),
            http_addr: default_http_addr(),
        }
    }
}

impl BridgeConfig {
    /// Build the core endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the base URL or API key is
    /// missing or invalid.
    pub fn endpoint(&self) -> Result<EndpointConfig, ApiError> {
        let base_url = self.base_url.as_deref().ok_or_else(|| ApiError::Configuration {
            message: "base_url is not set (config file or PMB_BASE_URL)".to_string(),
        })?;
        let api_key = self.api_key.clone().ok_or_else(|| ApiError::Configuration {
            message: "api_key is not set (config file or PMB_API_KEY)".to_string(),
        })?;
        Ok(EndpointConfig::new(base_url, api_key)?
            .with_bearer_token(self.attachment_token.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_fetch_timeout(Duration::from_secs(self.fetch_timeout_secs)))
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "<redacted>".to_string());
        Self {
            api_key: mask(&self.api_key),
            attachment_token: mask(&self.attachment_token),
            ..self.clone()
        }
    }
}
