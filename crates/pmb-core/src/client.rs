//! The admin API client.
//!
//! [`ApiClient::call`] runs the full pipeline for one logical operation:
//!
//! 1. validate attachment descriptors (no I/O)
//! 2. resolve attachments to bytes (inline decode or remote fetch)
//! 3. build the canonical query and sign it
//! 4. assemble the request (GET, URL-encoded body, or multipart)
//! 5. send it once and interpret the reply

use reqwest::Method;
use tracing::debug;

use crate::attachment::{self, AttachmentSpec};
use crate::config::EndpointConfig;
use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, error_chain};
use crate::params::ParamMap;
use crate::request::PreparedRequest;
use crate::signing::CanonicalQuery;
use crate::transport;

/// Per-call options for [`ApiClient::call`].
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Preferred method. Ignored when attachments are present.
    pub method: Method,
    pub params: ParamMap,
    pub attachments: Vec<AttachmentSpec>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            params: ParamMap::new(),
            attachments: Vec::new(),
        }
    }
}

impl CallOptions {
    pub fn get(params: ParamMap) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn post(params: ParamMap) -> Self {
        Self {
            method: Method::POST,
            params,
            ..Self::default()
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<AttachmentSpec>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Client for one account's admin API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: EndpointConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: EndpointConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("pm-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ApiError::configuration(format!("cannot build HTTP client: {}", error_chain(&e)))
            })?;
        Ok(Self { config, http })
    }

    /// Use an existing `reqwest` client (shared pools, custom TLS).
    pub fn with_http_client(config: EndpointConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Describe the signed request for `action` without sending it.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::call`], minus the transport and envelope failures.
    pub async fn prepare(
        &self,
        action: &str,
        options: CallOptions,
    ) -> Result<PreparedRequest, ApiError> {
        let CallOptions {
            method,
            params,
            attachments,
        } = options;

        let resolved = if attachments.is_empty() {
            Vec::new()
        } else {
            attachment::resolve_all(&self.http, &self.config, &attachments).await?
        };

        let signed = CanonicalQuery::new(action, &params).sign(self.config.api_key());
        Ok(PreparedRequest::build(
            self.config.api_url()?,
            method,
            signed,
            resolved,
        ))
    }

    /// Run `action` against the admin API and return the `ok` envelope.
    ///
    /// The envelope is returned as received; extracting `data` is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] variant; see [`crate::error`].
    pub async fn call(&self, action: &str, options: CallOptions) -> Result<ApiEnvelope, ApiError> {
        debug!(
            action,
            attachments = options.attachments.len(),
            "calling admin API"
        );
        let request = self.prepare(action, options).await?;
        transport::execute(&self.http, request, self.config.request_timeout()).await
    }
}
