//! Error taxonomy for calls against the admin API.
//!
//! Every failure a call can produce is one [`ApiError`] variant. Each variant
//! carries enough context (filename, URL, status, envelope text) to be shown
//! to the end user verbatim; nothing here is retried or recovered locally.

use thiserror::Error;

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint configuration is invalid or missing.
    Configuration,
    /// Parameters or attachment descriptors supplied by the caller are unusable.
    CallerInput,
    /// An attachment could not be turned into a non-empty payload.
    AttachmentResolution,
    /// The remote host could not be reached.
    Transport,
    /// The remote host answered with a non-2xx status.
    Http,
    /// The remote host answered 2xx but the envelope reports failure.
    Api,
}

/// Errors returned by [`crate::ApiClient::call`] and its building blocks.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid endpoint configuration (fatal at startup)
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Malformed parameter shape or ambiguous attachment source
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Inline attachment data is not valid base64
    #[error("attachment '{filename}' could not be decoded: {message}")]
    AttachmentDecode { filename: String, message: String },

    /// Attachment resolved to zero bytes
    #[error("attachment '{filename}' is empty")]
    AttachmentEmpty { filename: String },

    /// Remote attachment fetch failed
    #[error("failed to fetch attachment from {url}{}: {message}", fmt_status(.status))]
    AttachmentFetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Network-level failure reaching the admin API
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Non-2xx HTTP response from the admin API
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// 2xx response whose envelope status is not `ok`
    #[error("API error{}: {}", fmt_code(.code), fmt_api_message(.message, .details, .format_hint))]
    Api {
        message: String,
        code: Option<String>,
        details: Option<String>,
        format_hint: Option<String>,
    },
}

impl ApiError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classify this error into its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::InvalidInput { .. } => ErrorKind::CallerInput,
            Self::AttachmentDecode { .. }
            | Self::AttachmentEmpty { .. }
            | Self::AttachmentFetch { .. } => ErrorKind::AttachmentResolution,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Http { .. } => ErrorKind::Http,
            Self::Api { .. } => ErrorKind::Api,
        }
    }

    /// HTTP status associated with this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AttachmentFetch { status, .. } => *status,
            _ => None,
        }
    }
}

/// Join envelope message, field detail and format hint, in that order.
pub(crate) fn combine_api_message(
    message: &str,
    details: Option<&str>,
    format_hint: Option<&str>,
) -> String {
    let mut out = message.to_string();
    if let Some(details) = details.filter(|d| !d.is_empty()) {
        out.push_str(" (");
        out.push_str(details);
        out.push(')');
    }
    if let Some(hint) = format_hint.filter(|h| !h.is_empty()) {
        out.push_str("; expected format: ");
        out.push_str(hint);
    }
    out
}

fn fmt_api_message(
    message: &str,
    details: &Option<String>,
    format_hint: &Option<String>,
) -> String {
    combine_api_message(message, details.as_deref(), format_hint.as_deref())
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn fmt_code(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

/// Render an error together with its `source()` chain.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
