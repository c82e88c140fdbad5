//! Request execution and response interpretation.
//!
//! [`execute`] sends exactly one request and never retries. HTTP status and
//! envelope status are checked independently: a non-2xx status fails before
//! the body is parsed, and a 2xx status still fails unless the envelope says
//! `ok`.

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::envelope::ApiEnvelope;
use crate::error::{ApiError, error_chain};
use crate::request::{FORM_CONTENT_TYPE, PreparedRequest, RequestBody};

/// Longest server response excerpt kept in an [`ApiError::Http`] reason.
const MAX_REASON_LEN: usize = 512;

/// Send `request` and interpret the reply.
///
/// # Errors
///
/// - [`ApiError::Transport`] when the host cannot be reached or the reply
///   cannot be read.
/// - [`ApiError::Http`] for a non-2xx status, whatever the body says.
/// - [`ApiError::Api`] for a 2xx reply whose envelope is not `ok`.
pub async fn execute(
    http: &reqwest::Client,
    request: PreparedRequest,
    timeout: std::time::Duration,
) -> Result<ApiEnvelope, ApiError> {
    let builder = into_reqwest(http, request)?.timeout(timeout);

    let response = builder.send().await.map_err(|e| {
        let message = error_chain(&e);
        warn!("admin API request failed: {message}");
        ApiError::Transport { message }
    })?;

    let status = response.status();
    if !status.is_success() {
        // An unreadable body still yields Http with the received status.
        let body = match response.bytes().await {
            Ok(body) => body.to_vec(),
            Err(e) => {
                debug!("failed to read error response body: {}", error_chain(&e));
                Vec::new()
            }
        };
        let reason = http_reason(status, &body);
        warn!(status = status.as_u16(), "admin API returned HTTP error: {reason}");
        return Err(ApiError::Http {
            status: status.as_u16(),
            reason,
        });
    }

    let body = response.bytes().await.map_err(|e| ApiError::Transport {
        message: format!("failed to read response body: {}", error_chain(&e)),
    })?;
    let envelope = ApiEnvelope::parse(&body)?;
    envelope.into_result().inspect_err(|e| {
        warn!("admin API reported failure: {e}");
    })
}

fn into_reqwest(
    http: &reqwest::Client,
    request: PreparedRequest,
) -> Result<reqwest::RequestBuilder, ApiError> {
    debug!(
        method = %request.method,
        path = request.url.path(),
        body = request.body.kind(),
        "sending admin API request"
    );
    let builder = http.request(request.method, request.url);
    Ok(match request.body {
        RequestBody::Empty => builder,
        RequestBody::Form(body) => builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body),
        RequestBody::Multipart {
            fields,
            attachments,
        } => {
            let mut form = Form::new();
            for (key, value) in fields {
                form = form.text(key, value);
            }
            for attachment in attachments {
                let part = Part::bytes(attachment.bytes)
                    .file_name(attachment.filename.clone())
                    .mime_str(&attachment.content_type)
                    .map_err(|e| {
                        ApiError::invalid_input(format!(
                            "attachment '{}' has an invalid content type '{}': {e}",
                            attachment.filename, attachment.content_type
                        ))
                    })?;
                form = form.part(attachment.field_name, part);
            }
            builder.multipart(form)
        }
    })
}

/// Reason text for a non-2xx reply: the body when there is one, otherwise the
/// canonical reason phrase.
fn http_reason(status: reqwest::StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
    }
    if text.chars().count() > MAX_REASON_LEN {
        let cut: String = text.chars().take(MAX_REASON_LEN).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
