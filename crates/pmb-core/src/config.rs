//! Endpoint configuration for the admin API.
//!
//! [`EndpointConfig`] is built once at startup and then only read. It is
//! shared by every in-flight call, so it carries no interior mutability.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

/// Path of the admin API, relative to the account base URL.
pub const API_PATH: &str = "api/admin/v2";

/// Default bound on a single admin API call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on a single remote attachment fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable account endpoint and credentials.
#[derive(Clone)]
pub struct EndpointConfig {
    base_url: Url,
    api_key: String,
    bearer_token: Option<String>,
    request_timeout: Duration,
    fetch_timeout: Duration,
}

impl EndpointConfig {
    /// Validate and normalise an account base URL and API key.
    ///
    /// The base URL must be an absolute `http` or `https` URL. A trailing `/`
    /// is appended when missing so [`API_PATH`] joins below any account
    /// sub-path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] for an empty key or a malformed URL.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ApiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ApiError::configuration("API key must not be empty"));
        }
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ApiError::configuration("base URL must not be empty"));
        }
        let mut base_url = Url::parse(trimmed)
            .map_err(|e| ApiError::configuration(format!("invalid base URL '{trimmed}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ApiError::configuration(format!(
                "base URL '{trimmed}' must be an absolute http(s) URL"
            )));
        }
        base_url.set_query(None);
        base_url.set_fragment(None);
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            api_key,
            bearer_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        })
    }

    /// Bearer token sent with remote attachment fetches. Empty means none.
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Normalised account base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Full URL of the admin API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the path cannot be joined.
    pub fn api_url(&self) -> Result<Url, ApiError> {
        self.base_url
            .join(API_PATH)
            .map_err(|e| ApiError::configuration(format!("cannot build API URL: {e}")))
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout", &self.request_timeout)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}
