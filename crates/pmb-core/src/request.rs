//! Outbound request assembly.
//!
//! [`PreparedRequest::build`] decides the method and body shape for a signed
//! query. It performs no I/O; [`crate::transport`] turns the description into
//! a `reqwest` request.

use reqwest::Method;
use url::Url;

use crate::attachment::ResolvedAttachment;
use crate::signing::SignedQuery;

/// Content type of a URL-encoded body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of a prepared request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// GET: signed parameters travel in the URL query string.
    Empty,
    /// Non-GET without attachments: URL-encoded signed parameters.
    Form(String),
    /// Attachments present: signed pairs as text fields, then binary parts.
    Multipart {
        fields: Vec<(String, String)>,
        attachments: Vec<ResolvedAttachment>,
    },
}

impl RequestBody {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "none",
            Self::Form(_) => "form",
            Self::Multipart { .. } => "multipart",
        }
    }
}

/// A fully described request, ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// Assemble a request for `api_url`.
    ///
    /// Any attachment forces a multipart POST whatever `method` asks for.
    /// Without attachments, GET carries the signed query in the URL and any
    /// other method carries it as a URL-encoded body.
    pub fn build(
        api_url: Url,
        method: Method,
        signed: SignedQuery,
        attachments: Vec<ResolvedAttachment>,
    ) -> Self {
        if !attachments.is_empty() {
            return Self {
                method: Method::POST,
                url: api_url,
                body: RequestBody::Multipart {
                    fields: signed.pairs().to_vec(),
                    attachments,
                },
            };
        }

        if method == Method::GET {
            let mut url = api_url;
            url.set_query(Some(signed.query_string()));
            Self {
                method,
                url,
                body: RequestBody::Empty,
            }
        } else {
            Self {
                method,
                url: api_url,
                body: RequestBody::Form(signed.query_string().to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamMap;
    use crate::signing::CanonicalQuery;

    fn api_url() -> Url {
        Url::parse("https://acme.example.com/api/admin/v2").unwrap()
    }

    fn signed() -> SignedQuery {
        CanonicalQuery::new("get_projects", &ParamMap::new().with("filter", "active")).sign("k")
    }

    fn attachment() -> ResolvedAttachment {
        ResolvedAttachment {
            field_name: "attach[0]".to_string(),
            filename: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"hi".to_vec(),
        }
    }

    #[test]
    fn test_get_puts_query_in_url() {
        let signed = signed();
        let req = PreparedRequest::build(api_url(), Method::GET, signed.clone(), vec![]);
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.body, RequestBody::Empty);
        assert_eq!(
            req.url.as_str(),
            format!(
                "https://acme.example.com/api/admin/v2?action=get_projects&filter=active&hash={}",
                signed.hash()
            )
        );
    }

    #[test]
    fn test_post_without_attachments_is_form() {
        let signed = signed();
        let req = PreparedRequest::build(api_url(), Method::POST, signed.clone(), vec![]);
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.query(), None);
        assert_eq!(req.body, RequestBody::Form(signed.query_string().to_string()));
    }

    #[test]
    fn test_attachment_forces_multipart_post() {
        let req = PreparedRequest::build(api_url(), Method::GET, signed(), vec![attachment()]);
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.query(), None);
        match req.body {
            RequestBody::Multipart {
                fields,
                attachments,
            } => {
                let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["action", "filter", "hash"]);
                assert_eq!(attachments.len(), 1);
            }
            other => panic!("expected multipart body, got {}", other.kind()),
        }
    }

    #[test]
    fn test_multipart_fields_are_unencoded() {
        let params = ParamMap::new().with("name", "a b&c");
        let signed = CanonicalQuery::new("post_task", &params).sign("k");
        let req = PreparedRequest::build(api_url(), Method::POST, signed, vec![attachment()]);
        let RequestBody::Multipart { fields, .. } = req.body else {
            panic!("expected multipart body");
        };
        assert_eq!(fields[1], ("name".to_string(), "a b&c".to_string()));
    }
}
