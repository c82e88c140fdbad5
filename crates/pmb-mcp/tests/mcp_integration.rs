//! End-to-end tests: MCP messages in, signed admin API calls out, against a
//! local mockito backend.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use mockito::{Matcher, Server};
use pm_bridge_core::signing::digest;
use pm_bridge_core::{ApiClient, EndpointConfig};
use pm_bridge_mcp::McpServer;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

const KEY: &str = "integration-key";

fn mcp_for(server: &Server) -> McpServer {
    let config = EndpointConfig::new(&server.url(), KEY).expect("valid config");
    McpServer::new(ApiClient::new(config).expect("client builds"))
}

fn call(id: u64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments},
    })
    .to_string()
}

#[tokio::test]
async fn get_task_returns_data_as_text_and_structured_content() {
    let mut backend = Server::new_async().await;
    let canonical = "action=get_task&task_id=17&extra%5B0%5D=comments";
    let mock = backend
        .mock("GET", "/api/admin/v2")
        .match_query(Matcher::Exact(format!("{canonical}&hash={}", digest(canonical, KEY))))
        .with_status(200)
        .with_body(r#"{"status":"ok","data":{"id":"17","name":"Write docs"}}"#)
        .create_async()
        .await;

    let resp = mcp_for(&backend)
        .handle_message(&call(
            1,
            "get_task",
            json!({"extra": ["comments"], "task_id": "17", "unused": true}),
        ))
        .await
        .expect("response");

    mock.assert_async().await;
    let result = &resp["result"];
    assert_eq!(result["isError"], false);
    assert_eq!(result["structuredContent"]["name"], "Write docs");
    let text: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text["id"], "17");
}

#[tokio::test]
async fn create_task_with_attachment_is_multipart() {
    let mut backend = Server::new_async().await;
    let mock = backend
        .mock("POST", "/api/admin/v2")
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="project_id"\r\n\r\n3"#.to_string()),
            Matcher::Regex(r#"name="priority"\r\n\r\n2"#.to_string()),
            Matcher::Regex(r#"name="attach\[0\]"; filename="log.txt""#.to_string()),
            Matcher::Regex("line one".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"{"status":"ok","data":{"id":"99"}}"#)
        .create_async()
        .await;

    let args = json!({
        "project_id": "3",
        "name": "Investigate crash",
        "priority": 2,
        "attachments": [{
            "filename": "log.txt",
            "content_type": "text/plain",
            "data": "bGluZSBvbmU=",
        }],
    });
    let resp = mcp_for(&backend)
        .handle_message(&call(2, "create_task", args))
        .await
        .expect("response");

    mock.assert_async().await;
    assert_eq!(resp["result"]["structuredContent"]["id"], "99");
}

#[tokio::test]
async fn api_error_envelope_becomes_tool_error() {
    let mut backend = Server::new_async().await;
    backend
        .mock("POST", "/api/admin/v2")
        .with_status(200)
        .with_body(r#"{"status":"error","message":"Name taken","message_details":"name"}"#)
        .create_async()
        .await;

    let resp = mcp_for(&backend)
        .handle_message(&call(3, "create_project", json!({"name": "Dup"})))
        .await
        .expect("response");

    assert_eq!(resp["result"]["isError"], true);
    let text = resp["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Name taken"), "{text}");
}

#[tokio::test]
async fn invalid_arguments_never_reach_backend() {
    let mut backend = Server::new_async().await;
    let mock = backend
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let resp = mcp_for(&backend)
        .handle_message(&call(4, "get_project", json!({"project_id": 5})))
        .await
        .expect("response");

    mock.assert_async().await;
    assert_eq!(resp["result"]["isError"], true);
}

#[tokio::test]
async fn list_without_data_returns_null() {
    let mut backend = Server::new_async().await;
    backend
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok"}"#)
        .create_async()
        .await;

    let resp = mcp_for(&backend)
        .handle_message(&call(5, "list_tasks", json!({})))
        .await
        .expect("response");
    assert_eq!(resp["result"]["structuredContent"], json!({"data": null}));
}

#[tokio::test]
async fn resource_read_fetches_single_project() {
    let mut backend = Server::new_async().await;
    let canonical = "action=get_project&project_id=8";
    backend
        .mock("GET", "/api/admin/v2")
        .match_query(Matcher::Exact(format!("{canonical}&hash={}", digest(canonical, KEY))))
        .with_status(200)
        .with_body(r#"{"status":"ok","data":{"id":"8"}}"#)
        .create_async()
        .await;

    let msg = json!({
        "jsonrpc": "2.0",
        "id": 6,
        "method": "resources/read",
        "params": {"uri": "pm://projects/8"},
    });
    let resp = mcp_for(&backend)
        .handle_message(&msg.to_string())
        .await
        .expect("response");

    let contents = &resp["result"]["contents"][0];
    assert_eq!(contents["uri"], "pm://projects/8");
    assert_eq!(contents["mimeType"], "application/json");
    let text: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert_eq!(text["id"], "8");
}

#[tokio::test]
async fn http_500_on_resource_read_is_jsonrpc_error() {
    let mut backend = Server::new_async().await;
    backend
        .mock("GET", Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let msg = r#"{"jsonrpc":"2.0","id":7,"method":"resources/read","params":{"uri":"pm://projects"}}"#;
    let resp = mcp_for(&backend).handle_message(msg).await.expect("response");
    assert_eq!(resp["error"]["code"], -32603);
    assert_eq!(resp["error"]["data"]["status"], 500);
}

#[tokio::test]
async fn http_transport_round_trip() {
    let mut backend = Server::new_async().await;
    backend
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok","data":[{"id":"1"}]}"#)
        .create_async()
        .await;

    let app = pm_bridge_mcp::http::router(mcp_for(&backend));
    let req = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(call(8, "list_projects", json!({"filter": "active"}))))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["result"]["structuredContent"]["data"][0]["id"], "1");
}

#[tokio::test]
async fn stdio_session_initialize_then_call() {
    let mut backend = Server::new_async().await;
    backend
        .mock("GET", Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok","data":[]}"#)
        .create_async()
        .await;

    let (mut client_in, server_in) = tokio::io::duplex(16 * 1024);
    let (server_out, mut client_out) = tokio::io::duplex(16 * 1024);
    let handle = tokio::spawn(pm_bridge_mcp::stdio::run(mcp_for(&backend), server_in, server_out));

    let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#;
    let initialized = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
    let input = format!("{init}\n{initialized}\n{}\n", call(2, "list_projects", json!({})));
    client_in.write_all(input.as_bytes()).await.unwrap();
    drop(client_in);

    handle.await.unwrap().unwrap();
    let mut out = String::new();
    client_out.read_to_string(&mut out).await.unwrap();

    let mut responses: Vec<Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    responses.sort_by_key(|v| v["id"].as_u64());
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(responses[1]["result"]["isError"], false);
}
