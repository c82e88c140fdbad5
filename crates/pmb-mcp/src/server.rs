//! MCP JSON-RPC dispatcher shared by the stdio and HTTP transports.
//!
//! [`McpServer::handle_message`] takes one raw message and returns the
//! response to send, or `None` for notifications and client responses.

use std::sync::Arc;

use pm_bridge_core::ApiClient;
use serde_json::{Value, json};

use crate::handlers;
use crate::resources::{self, MIME_JSON, ResourceRef};
use crate::tools;

/// JSON-RPC error code: invalid JSON.
pub const ERR_PARSE: i64 = -32700;

/// JSON-RPC error code: not a valid request object.
pub const ERR_INVALID_REQUEST: i64 = -32600;

/// JSON-RPC error code: method not found.
pub const ERR_METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC error code: invalid method parameters.
pub const ERR_INVALID_PARAMS: i64 = -32602;

/// JSON-RPC error code: internal error.
pub const ERR_INTERNAL: i64 = -32603;

/// Protocol revisions this server speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

pub const SERVER_NAME: &str = "pm-bridge-mcp";

#[derive(Debug, Clone)]
pub struct McpServer {
    client: Arc<ApiClient>,
}

impl McpServer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Handle one raw JSON-RPC message.
    pub async fn handle_message(&self, raw: &str) -> Option<Value> {
        let msg: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("failed to parse JSON-RPC message: {e}");
                return Some(make_error_response(
                    Value::Null,
                    ERR_PARSE,
                    "parse error",
                    json!({"detail": e.to_string()}),
                ));
            }
        };
        self.handle_value(msg).await
    }

    /// Handle one already-parsed JSON-RPC message.
    pub async fn handle_value(&self, msg: Value) -> Option<Value> {
        if msg.is_array() {
            return Some(make_error_response(
                Value::Null,
                ERR_INVALID_REQUEST,
                "batching not supported",
                Value::Null,
            ));
        }
        let Some(obj) = msg.as_object() else {
            return Some(make_error_response(
                Value::Null,
                ERR_INVALID_REQUEST,
                "invalid request",
                Value::Null,
            ));
        };

        let id = obj.get("id").cloned();
        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            if id.is_some() && (obj.contains_key("result") || obj.contains_key("error")) {
                tracing::debug!("ignoring client response");
                return None;
            }
            return Some(make_error_response(
                id.unwrap_or(Value::Null),
                ERR_INVALID_REQUEST,
                "invalid request: missing method",
                Value::Null,
            ));
        };
        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return id.map(|id| {
                make_error_response(id, ERR_INVALID_REQUEST, "jsonrpc must be \"2.0\"", Value::Null)
            });
        }

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        let Some(id) = id else {
            tracing::debug!(method, "notification");
            return None;
        };

        tracing::info!(method, "dispatching request");
        let response = match method {
            "initialize" => make_mcp_success(id, initialize_result(&params)),
            "ping" => make_mcp_success(id, json!({})),
            "tools/list" => make_mcp_success(id, json!({"tools": tools::list_tools()})),
            "tools/call" => self.handle_tools_call(id, &params).await,
            "resources/list" => {
                make_mcp_success(id, json!({"resources": resources::list_resources()}))
            }
            "resources/templates/list" => make_mcp_success(
                id,
                json!({"resourceTemplates": resources::list_templates()}),
            ),
            "resources/read" => self.handle_resources_read(id, &params).await,
            other => make_error_response(
                id,
                ERR_METHOD_NOT_FOUND,
                &format!("method not found: {other}"),
                Value::Null,
            ),
        };
        Some(response)
    }

    async fn handle_tools_call(&self, id: Value, params: &Value) -> Value {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return make_error_response(
                id,
                ERR_INVALID_PARAMS,
                "tools/call requires params.name",
                Value::Null,
            );
        };
        let Some(tool) = tools::find(name) else {
            return make_error_response(
                id,
                ERR_INVALID_PARAMS,
                &format!("unknown tool: {name}"),
                Value::Null,
            );
        };

        let arguments = params.get("arguments").cloned();
        match handlers::call_tool(&self.client, tool, arguments).await {
            Ok(data) => make_mcp_success(id, tool_success(data)),
            Err(e) => {
                tracing::warn!(tool = name, kind = ?e.kind(), "tool call failed: {e}");
                make_mcp_error_result(id, &e.to_string())
            }
        }
    }

    async fn handle_resources_read(&self, id: Value, params: &Value) -> Value {
        let Some(uri) = params.get("uri").and_then(Value::as_str) else {
            return make_error_response(
                id,
                ERR_INVALID_PARAMS,
                "resources/read requires params.uri",
                Value::Null,
            );
        };
        let Some(resource) = ResourceRef::parse(uri) else {
            return make_error_response(
                id,
                ERR_INVALID_PARAMS,
                &format!("unknown resource: {uri}"),
                json!({"uri": uri}),
            );
        };

        match handlers::read_resource(&self.client, &resource).await {
            Ok(data) => make_mcp_success(
                id,
                json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": MIME_JSON,
                        "text": pretty(&data),
                    }]
                }),
            ),
            Err(e) => {
                tracing::warn!(uri, kind = ?e.kind(), "resource read failed: {e}");
                make_error_response(
                    id,
                    ERR_INTERNAL,
                    &e.to_string(),
                    json!({"uri": uri, "status": e.status()}),
                )
            }
        }
    }
}

/// Pick the protocol version to answer `initialize` with: the client's when
/// supported, otherwise the newest this server knows.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|r| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|v| **v == r))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

fn initialize_result(params: &Value) -> Value {
    let requested = params.get("protocolVersion").and_then(Value::as_str);
    json!({
        "protocolVersion": negotiate_protocol_version(requested),
        "capabilities": {
            "tools": {"listChanged": false},
            "resources": {"listChanged": false, "subscribe": false},
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn pretty(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

/// `structuredContent` must be an object; other values are wrapped as
/// `{"data": value}`.
fn tool_success(data: Value) -> Value {
    let text = pretty(&data);
    let structured = if data.is_object() {
        data
    } else {
        json!({"data": data})
    };
    json!({
        "content": [{"type": "text", "text": text}],
        "structuredContent": structured,
        "isError": false,
    })
}

/// Construct a JSON-RPC success response.
pub fn make_mcp_success(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

/// Construct a tool result carrying an error message (`isError: true`).
pub fn make_mcp_error_result(id: Value, message: &str) -> Value {
    make_mcp_success(
        id,
        json!({
            "content": [{"type": "text", "text": message}],
            "isError": true,
        }),
    )
}

/// Construct a JSON-RPC error response.
pub fn make_error_response(id: Value, code: i64, message: &str, data: Value) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if !data.is_null() {
        error["data"] = data;
    }
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": error,
    })
}
