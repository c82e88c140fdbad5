//! The admin API response envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// The only `status` value that denotes success.
pub const STATUS_OK: &str = "ok";

/// Top-level JSON object returned by the admin API.
///
/// Unknown members are kept in [`ApiEnvelope::other`] so an envelope
/// serialises back to the object it was parsed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine error code; numeric on the wire but kept as raw JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Value>,
    /// Field-validation detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_details: Option<String>,
    /// Expected-format hint for the failing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl ApiEnvelope {
    /// Parse a 2xx response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] if the body is not a JSON object.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| ApiError::Api {
            message: format!("malformed response envelope: {e}"),
            code: None,
            details: None,
            format_hint: None,
        })?;
        if !value.is_object() {
            return Err(ApiError::Api {
                message: "malformed response envelope: expected a JSON object".to_string(),
                code: None,
                details: None,
                format_hint: None,
            });
        }
        serde_json::from_value(value).map_err(|e| ApiError::Api {
            message: format!("malformed response envelope: {e}"),
            code: None,
            details: None,
            format_hint: None,
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }

    /// Return `self` when the status is `ok`, otherwise the matching error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] for any other or missing status.
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.is_ok() {
            return Ok(self);
        }
        let message = match (self.message, self.status.as_deref()) {
            (Some(m), _) if !m.is_empty() => m,
            (_, Some(status)) => format!("request failed with status '{status}'"),
            (_, None) => "response envelope has no status".to_string(),
        };
        Err(ApiError::Api {
            message,
            code: self.status_code.as_ref().and_then(code_text),
            details: self.message_details,
            format_hint: self.test,
        })
    }

    /// The envelope as a plain JSON object.
    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn code_text(code: &Value) -> Option<String> {
    match code {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_passes() {
        let env = ApiEnvelope::parse(br#"{"status":"ok","data":[{"id":"1"}]}"#)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(env.data, Some(json!([{"id": "1"}])));
    }

    #[test]
    fn test_unknown_members_round_trip() {
        let body = json!({"status": "ok", "data": {"id": "7"}, "total": 3});
        let env = ApiEnvelope::parse(body.to_string().as_bytes()).unwrap();
        assert_eq!(env.into_value(), body);
    }

    #[test]
    fn test_error_envelope_combines_detail() {
        let err = ApiEnvelope::parse(
            br#"{"status":"error","message":"Field is required","message_details":"filter"}"#,
        )
        .unwrap()
        .into_result()
        .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Field is required"));
        assert!(text.contains("filter"));
    }

    #[test]
    fn test_error_envelope_carries_code_and_hint() {
        let err = ApiEnvelope::parse(
            br#"{"status":"error","message":"Bad date","status_code":422,"message_details":"due_date","test":"YYYY-MM-DD"}"#,
        )
        .unwrap()
        .into_result()
        .unwrap_err();
        match err {
            ApiError::Api {
                code, format_hint, ..
            } => {
                assert_eq!(code.as_deref(), Some("422"));
                assert_eq!(format_hint.as_deref(), Some("YYYY-MM-DD"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_status_is_failure() {
        let err = ApiEnvelope::parse(br#"{"data":[]}"#)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("no status"));
    }

    #[test]
    fn test_other_status_without_message() {
        let err = ApiEnvelope::parse(br#"{"status":"denied"}"#)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        assert!(ApiEnvelope::parse(b"[1,2]").is_err());
        assert!(ApiEnvelope::parse(b"<html>").is_err());
    }
}
