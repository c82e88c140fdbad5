//! Signed request transport for the project-management admin API.
//!
//! This crate turns an action name plus parameters into an authenticated
//! request against `<account>/api/admin/v2`, sends it once, and maps the
//! reply onto [`ApiEnvelope`] or a typed [`ApiError`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), pm_bridge_core::ApiError> {
//! use pm_bridge_core::{ApiClient, CallOptions, EndpointConfig, ParamMap};
//!
//! let config = EndpointConfig::new("https://acme.example.com", "api-key")?;
//! let client = ApiClient::new(config)?;
//! let envelope = client
//!     .call("get_projects", CallOptions::get(ParamMap::new().with("filter", "active")))
//!     .await?;
//! println!("{:?}", envelope.data);
//! # Ok(())
//! # }
//! ```

pub mod attachment;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod params;
pub mod request;
pub mod signing;
pub mod transport;

pub use attachment::{AttachmentSource, AttachmentSpec, ResolvedAttachment};
pub use client::{ApiClient, CallOptions};
pub use config::EndpointConfig;
pub use envelope::ApiEnvelope;
pub use error::{ApiError, ErrorKind};
pub use params::{ParamMap, ParamValue, Scalar};
pub use request::{PreparedRequest, RequestBody};

// Re-exported so callers can name methods without a direct reqwest dependency.
pub use reqwest::Method;
