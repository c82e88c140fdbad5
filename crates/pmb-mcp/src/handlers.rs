//! Converts tool and resource invocations into admin API calls.
//!
//! Argument validation happens here, before any network I/O: a missing
//! required field or a wrongly typed value never reaches the client.

use pm_bridge_core::{ApiClient, ApiError, AttachmentSpec, CallOptions, ParamMap, ParamValue};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::resources::ResourceRef;
use crate::tools::{FieldDef, FieldKind, ToolDef, ToolMethod};

/// One item of a `create_task.attachments` argument.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttachmentArg {
    filename: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

fn invalid(message: String) -> ApiError {
    ApiError::InvalidInput { message }
}

/// Build the call options for `tool` from raw MCP arguments.
///
/// Parameters follow the tool's declared field order; unknown keys are
/// ignored.
///
/// # Errors
///
/// Returns [`ApiError::InvalidInput`] if the arguments are not an object, a
/// required field is missing or any value has the wrong type.
pub fn build_call(tool: &ToolDef, arguments: Option<Value>) -> Result<CallOptions, ApiError> {
    let mut args = match arguments {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(invalid("tool arguments must be a JSON object".to_string())),
    };

    let mut params = ParamMap::new();
    let mut attachments = Vec::new();
    for field in tool.fields {
        let value = args.remove(field.name).filter(|v| !v.is_null());
        let Some(value) = value else {
            if field.required {
                return Err(invalid(format!("missing required argument '{}'", field.name)));
            }
            continue;
        };
        check_type(field, &value)?;
        if field.kind == FieldKind::Attachments {
            attachments = attachment_specs(field, value)?;
        } else {
            params.insert(field.name, ParamValue::from_json(field.name, value)?);
        }
    }

    let options = match tool.method {
        ToolMethod::Get => CallOptions::get(params),
        ToolMethod::Post => CallOptions::post(params),
    };
    Ok(options.with_attachments(attachments))
}

fn check_type(field: &FieldDef, value: &Value) -> Result<(), ApiError> {
    let ok = match field.kind {
        FieldKind::String => value
            .as_str()
            .is_some_and(|s| !(field.required && s.trim().is_empty())),
        FieldKind::Integer => value.is_i64() || value.is_u64(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::StringList => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        FieldKind::Attachments => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_object)),
    };
    if ok {
        return Ok(());
    }
    let expected = match field.kind {
        FieldKind::String if field.required => "a non-empty string",
        FieldKind::String => "a string",
        FieldKind::Integer => "an integer",
        FieldKind::Boolean => "a boolean",
        FieldKind::StringList => "an array of strings",
        FieldKind::Attachments => "an array of attachment objects",
    };
    Err(invalid(format!("argument '{}' must be {expected}", field.name)))
}

fn attachment_specs(field: &FieldDef, value: Value) -> Result<Vec<AttachmentSpec>, ApiError> {
    let items: Vec<AttachmentArg> = serde_json::from_value(value)
        .map_err(|e| invalid(format!("argument '{}' is invalid: {e}", field.name)))?;
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| AttachmentSpec {
            field_name: format!("attach[{index}]"),
            filename: item.filename,
            content_type: item.content_type,
            data: item.data,
            url: item.url,
        })
        .collect())
}

/// Run `tool` and return the envelope's `data` (or `null`).
///
/// # Errors
///
/// Any [`ApiError`] from argument validation or the call itself.
pub async fn call_tool(
    client: &ApiClient,
    tool: &ToolDef,
    arguments: Option<Value>,
) -> Result<Value, ApiError> {
    let options = build_call(tool, arguments)?;
    let envelope = client.call(tool.action, options).await?;
    Ok(envelope.data.unwrap_or(Value::Null))
}

/// Read a catalogue resource and return the envelope's `data` (or `null`).
///
/// # Errors
///
/// Any [`ApiError`] from the underlying call.
pub async fn read_resource(client: &ApiClient, resource: &ResourceRef) -> Result<Value, ApiError> {
    let params = match resource {
        ResourceRef::Projects => ParamMap::new(),
        ResourceRef::Project(id) => ParamMap::new().with("project_id", id.as_str()),
    };
    let envelope = client.call(resource.action(), CallOptions::get(params)).await?;
    Ok(envelope.data.unwrap_or(Value::Null))
}
