//! Attachment descriptors and their resolution into binary payloads.
//!
//! A caller supplies an [`AttachmentSpec`] with either base64 `data` or a
//! remote `url`. [`AttachmentSpec::source`] turns the two optional fields into
//! an [`AttachmentSource`], rejecting "both" and "neither". The resolver then
//! produces a [`ResolvedAttachment`] holding non-empty bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::EndpointConfig;
use crate::error::{ApiError, error_chain};

/// Content type used when an attachment does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Caller-facing attachment descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSpec {
    /// Multipart field name (e.g. `attach[0]`).
    pub field_name: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Base64-encoded inline payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Remote location of the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Where an attachment's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Base64 text carried in the descriptor.
    Inline(String),
    /// Payload fetched with a single GET.
    Remote(Url),
}

impl AttachmentSpec {
    pub fn inline(
        field_name: impl Into<String>,
        filename: impl Into<String>,
        base64_data: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            filename: filename.into(),
            data: Some(base64_data.into()),
            ..Self::default()
        }
    }

    pub fn remote(
        field_name: impl Into<String>,
        filename: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            filename: filename.into(),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Determine the single data source of this descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] when both or neither of `data` and
    /// `url` are set, when `url` does not parse, when `content_type` is not a
    /// `type/subtype` media type, or when `filename` or `field_name` is empty.
    pub fn source(&self) -> Result<AttachmentSource, ApiError> {
        if self.field_name.is_empty() {
            return Err(ApiError::invalid_input(format!(
                "attachment '{}' has no field name",
                self.filename
            )));
        }
        if self.filename.is_empty() {
            return Err(ApiError::invalid_input(format!(
                "attachment field '{}' has no filename",
                self.field_name
            )));
        }
        if let Some(content_type) = &self.content_type {
            validate_content_type(&self.filename, content_type)?;
        }
        match (&self.data, &self.url) {
            (Some(_), Some(_)) => Err(ApiError::invalid_input(format!(
                "attachment '{}' sets both inline data and a URL",
                self.filename
            ))),
            (None, None) => Err(ApiError::invalid_input(format!(
                "attachment '{}' has neither inline data nor a URL",
                self.filename
            ))),
            (Some(data), None) => Ok(AttachmentSource::Inline(data.clone())),
            (None, Some(url)) => Url::parse(url)
                .ok()
                .filter(|u| matches!(u.scheme(), "http" | "https"))
                .map(AttachmentSource::Remote)
                .ok_or_else(|| {
                    ApiError::invalid_input(format!(
                        "attachment '{}' has an invalid URL: {url}",
                        self.filename
                    ))
                }),
        }
    }
}

/// Check `content_type` the way the multipart part header will need it:
/// a valid header value of the form `type/subtype[; name=value]*`.
fn validate_content_type(filename: &str, content_type: &str) -> Result<(), ApiError> {
    let invalid = || {
        ApiError::invalid_input(format!(
            "attachment '{filename}' has an invalid content type '{content_type}'"
        ))
    };
    HeaderValue::from_str(content_type).map_err(|_| invalid())?;

    let mut parts = content_type.split(';');
    let essence = parts.next().unwrap_or_default().trim();
    let (kind, subtype) = essence.split_once('/').ok_or_else(invalid)?;
    if !is_token(kind) || !is_token(subtype) {
        return Err(invalid());
    }
    for param in parts {
        let (name, value) = param.split_once('=').ok_or_else(invalid)?;
        if !is_token(name.trim()) || value.trim().is_empty() {
            return Err(invalid());
        }
    }
    Ok(())
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// An attachment whose payload is in memory and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttachment {
    pub field_name: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Check every descriptor's source before any of them is resolved.
///
/// # Errors
///
/// Returns the first [`ApiError::InvalidInput`] encountered.
pub fn validate_all(specs: &[AttachmentSpec]) -> Result<Vec<AttachmentSource>, ApiError> {
    specs.iter().map(AttachmentSpec::source).collect()
}

/// Resolve descriptors in order; the first failure aborts the whole batch.
///
/// All sources are validated up front, so an ambiguous descriptor later in
/// the list prevents any remote fetch from starting.
///
/// # Errors
///
/// Returns [`ApiError::InvalidInput`] for an unusable descriptor, or one of
/// the attachment resolution variants for a decode or fetch failure.
pub async fn resolve_all(
    http: &reqwest::Client,
    config: &EndpointConfig,
    specs: &[AttachmentSpec],
) -> Result<Vec<ResolvedAttachment>, ApiError> {
    let sources = validate_all(specs)?;
    let mut resolved = Vec::with_capacity(specs.len());
    for (spec, source) in specs.iter().zip(sources) {
        let bytes = match source {
            AttachmentSource::Inline(data) => decode_inline(&spec.filename, &data)?,
            AttachmentSource::Remote(url) => fetch_remote(http, config, &url).await?,
        };
        resolved.push(ResolvedAttachment {
            field_name: spec.field_name.clone(),
            filename: spec.filename.clone(),
            content_type: spec
                .content_type
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            bytes,
        });
    }
    Ok(resolved)
}

/// Decode base64 inline data into non-empty bytes.
///
/// # Errors
///
/// Returns [`ApiError::AttachmentDecode`] or [`ApiError::AttachmentEmpty`].
pub fn decode_inline(filename: &str, data: &str) -> Result<Vec<u8>, ApiError> {
    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| ApiError::AttachmentDecode {
            filename: filename.to_string(),
            message: e.to_string(),
        })?;
    if bytes.is_empty() {
        return Err(ApiError::AttachmentEmpty {
            filename: filename.to_string(),
        });
    }
    Ok(bytes)
}

async fn fetch_remote(
    http: &reqwest::Client,
    config: &EndpointConfig,
    url: &Url,
) -> Result<Vec<u8>, ApiError> {
    debug!(url = %url, "fetching remote attachment");
    let mut request = http.get(url.clone()).timeout(config.fetch_timeout());
    if let Some(token) = config.bearer_token() {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let fetch_error = |status: Option<u16>, message: String| {
        warn!(url = %url, ?status, "remote attachment fetch failed: {message}");
        ApiError::AttachmentFetch {
            url: url.to_string(),
            status,
            message,
        }
    };

    let response = request
        .send()
        .await
        .map_err(|e| fetch_error(None, error_chain(&e)))?;
    let status = response.status();
    if !status.is_success() {
        let reason = status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
        return Err(fetch_error(Some(status.as_u16()), reason));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_error(Some(status.as_u16()), error_chain(&e)))?;
    if bytes.is_empty() {
        return Err(fetch_error(
            Some(status.as_u16()),
            "response body is empty".to_string(),
        ));
    }
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(server_url: &str) -> EndpointConfig {
        EndpointConfig::new(server_url, "key").unwrap()
    }

    #[test]
    fn test_both_sources_rejected() {
        let spec = AttachmentSpec {
            field_name: "attach[0]".to_string(),
            filename: "a.txt".to_string(),
            content_type: None,
            data: Some("aGk=".to_string()),
            url: Some("https://example.com/a.txt".to_string()),
        };
        let err = spec.source().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CallerInput);
        assert!(err.to_string().contains("a.txt"));
    }

    #[test]
    fn test_neither_source_rejected() {
        let spec = AttachmentSpec {
            field_name: "attach[0]".to_string(),
            filename: "a.txt".to_string(),
            ..AttachmentSpec::default()
        };
        assert_eq!(spec.source().unwrap_err().kind(), ErrorKind::CallerInput);
    }

    #[test]
    fn test_invalid_url_rejected() {
        let spec = AttachmentSpec::remote("attach[0]", "a.txt", "not a url");
        assert_eq!(spec.source().unwrap_err().kind(), ErrorKind::CallerInput);
    }

    #[test]
    fn test_inline_source() {
        let spec = AttachmentSpec::inline("attach[0]", "a.txt", "aGk=");
        assert_eq!(
            spec.source().unwrap(),
            AttachmentSource::Inline("aGk=".to_string())
        );
    }

    #[test]
    fn test_decode_inline() {
        assert_eq!(decode_inline("a.txt", "aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_decode_inline_empty_names_file() {
        let err = decode_inline("empty.bin", "").unwrap_err();
        assert!(matches!(
            err,
            ApiError::AttachmentEmpty { ref filename } if filename == "empty.bin"
        ));
    }

    #[test]
    fn test_decode_inline_garbage_names_file() {
        let err = decode_inline("bad.bin", "***").unwrap_err();
        assert!(matches!(err, ApiError::AttachmentDecode { .. }));
        assert!(err.to_string().contains("bad.bin"));
    }

    #[tokio::test]
    async fn test_resolve_defaults_content_type() {
        let http = reqwest::Client::new();
        let specs = vec![AttachmentSpec::inline("attach[0]", "a.bin", "AQID")];
        let resolved = resolve_all(&http, &config("http://127.0.0.1:9"), &specs)
            .await
            .unwrap();
        assert_eq!(resolved[0].content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(resolved[0].bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_remote_fetch_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files/report.pdf")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_body("PDF")
            .create_async()
            .await;

        let cfg = config(&server.url()).with_bearer_token(Some("tok-1".to_string()));
        let specs = vec![
            AttachmentSpec::remote(
                "attach[0]",
                "report.pdf",
                format!("{}/files/report.pdf", server.url()),
            )
            .with_content_type("application/pdf"),
        ];
        let resolved = resolve_all(&reqwest::Client::new(), &cfg, &specs)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resolved[0].bytes, b"PDF");
        assert_eq!(resolved[0].content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_remote_fetch_without_token_has_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files/a.txt")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body("x")
            .create_async()
            .await;

        let specs = vec![AttachmentSpec::remote(
            "attach[0]",
            "a.txt",
            format!("{}/files/a.txt", server.url()),
        )];
        resolve_all(&reqwest::Client::new(), &config(&server.url()), &specs)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remote_fetch_non_2xx_reports_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.txt")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing.txt", server.url());
        let specs = vec![AttachmentSpec::remote("attach[0]", "missing.txt", url.clone())];
        let err = resolve_all(&reqwest::Client::new(), &config(&server.url()), &specs)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains(&url));
    }

    #[tokio::test]
    async fn test_remote_fetch_empty_body_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/empty.txt")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let specs = vec![AttachmentSpec::remote(
            "attach[0]",
            "empty.txt",
            format!("{}/empty.txt", server.url()),
        )];
        let err = resolve_all(&reqwest::Client::new(), &config(&server.url()), &specs)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttachmentResolution);
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_content_type_validation() {
        let spec = |ct: &str| {
            AttachmentSpec::inline("attach[0]", "f.bin", "AQ==").with_content_type(ct)
        };
        assert!(spec("text/plain").source().is_ok());
        assert!(spec("text/plain; charset=utf-8").source().is_ok());
        assert!(spec("application/vnd.api+json").source().is_ok());
        let bad_values = [
            "not a mime type",
            "text",
            "text/",
            "/plain",
            "text/plain; charset",
            "te xt/plain",
        ];
        for bad in bad_values {
            let err = spec(bad).source().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::CallerInput, "{bad}");
            assert!(err.to_string().contains("content type"), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_bad_content_type_blocks_remote_fetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/f.bin")
            .with_status(200)
            .with_body("x")
            .expect(0)
            .create_async()
            .await;

        let specs = vec![
            AttachmentSpec::remote("attach[0]", "f.bin", format!("{}/f.bin", server.url()))
                .with_content_type("not a mime type"),
        ];
        let err = resolve_all(&reqwest::Client::new(), &config(&server.url()), &specs)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CallerInput);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ambiguous_descriptor_blocks_earlier_fetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/a.txt")
            .with_status(200)
            .with_body("x")
            .expect(0)
            .create_async()
            .await;

        let specs = vec![
            AttachmentSpec::remote("attach[0]", "a.txt", format!("{}/a.txt", server.url())),
            AttachmentSpec {
                field_name: "attach[1]".to_string(),
                filename: "b.txt".to_string(),
                ..AttachmentSpec::default()
            },
        ];
        let err = resolve_all(&reqwest::Client::new(), &config(&server.url()), &specs)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CallerInput);
        mock.assert_async().await;
    }
}
