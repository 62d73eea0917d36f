//! MCP Protocol Tests
//!
//! Exercises the handler and the stdio loop with JSON-RPC traffic:
//! - Initialization and version negotiation
//! - tools/list advertisement
//! - tools/call envelopes through a full connect → inspect session
//! - Malformed input

mod common;

use common::{dispatcher, populated_cluster};
use eks_mcp::mcp::protocol::error_codes;
use eks_mcp::mcp::{JsonRpcId, JsonRpcRequest, JsonRpcResponse, McpHandler, McpStdioServer};
use eks_mcp::testing::{MockAuthenticator, MockClusterApi};
use eks_mcp::tools;
use serde_json::{json, Value};
use std::sync::Arc;

// -----------------------------------------------------------------------------
// Test Helpers
// -----------------------------------------------------------------------------

fn create_test_handler() -> McpHandler {
    let (cluster, helm) = populated_cluster();
    McpHandler::new(Arc::new(dispatcher(MockAuthenticator::with_clients(cluster, helm))))
}

async fn request(handler: &mut McpHandler, id: i64, method: &str, params: Value) -> JsonRpcResponse {
    handler
        .handle_request(JsonRpcRequest::new(id, method, params))
        .await
        .expect("requests with an id always get a response")
}

async fn call_tool(handler: &mut McpHandler, id: i64, name: &str, arguments: Value) -> (bool, Value) {
    let response = request(handler, id, "tools/call", json!({"name": name, "arguments": arguments})).await;
    let result = response.result.expect("tools/call never fails at the protocol level");
    let text = result["content"][0]["text"].as_str().unwrap_or_default().to_string();
    let envelope: Value = serde_json::from_str(&text).expect("tool text is the JSON envelope");
    (result["isError"].as_bool().unwrap_or(false), envelope)
}

// -----------------------------------------------------------------------------
// Handler
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_tools_list_advertises_catalog_in_order() {
    let mut handler = create_test_handler();
    let response = request(&mut handler, 1, "tools/list", json!({})).await;
    let tools = response.result.unwrap()["tools"].as_array().cloned().unwrap_or_default();

    assert_eq!(tools.len(), 14);
    let expected: Vec<&str> = tools::catalog().list_tools().iter().map(|d| d.name.as_str()).collect();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(names, expected);

    for tool in &tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert!(tool["description"].as_str().is_some_and(|d| !d.is_empty()));
    }

    let logs = tools.iter().find(|t| t["name"] == "get_pod_logs").unwrap();
    assert_eq!(logs["inputSchema"]["required"], json!(["podName"]));
    assert_eq!(logs["inputSchema"]["properties"]["tailLines"]["default"], 100);
}

#[tokio::test]
async fn test_full_session_over_handler() {
    let mut handler = create_test_handler();

    let init = request(&mut handler, 1, "initialize", json!({"protocolVersion": "2025-03-26"})).await;
    assert_eq!(init.result.unwrap()["protocolVersion"], "2025-03-26");

    let (is_error, envelope) = call_tool(&mut handler, 2, "list_pods", json!({})).await;
    assert!(is_error);
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["errorKind"], "NotConnected");

    let (is_error, envelope) =
        call_tool(&mut handler, 3, "connect_to_eks", json!({"clusterName": "prod", "region": "us-west-2"})).await;
    assert!(!is_error);
    assert_eq!(envelope["data"]["clusterName"], "prod");

    let (is_error, envelope) = call_tool(&mut handler, 4, "list_pods", json!({})).await;
    assert!(!is_error);
    assert_eq!(envelope["data"]["count"], 2);
    assert_eq!(envelope["metadata"]["toolName"], "list_pods");
    assert_eq!(envelope["metadata"]["clusterInfo"]["clusterName"], "prod");
    assert!(envelope["summary"]["title"].is_string());
}

#[tokio::test]
async fn test_tools_call_without_arguments() {
    let mut handler = create_test_handler();
    let response = request(&mut handler, 9, "tools/call", json!({"name": "help"})).await;
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);
}

#[tokio::test]
async fn test_unknown_method_and_string_ids() {
    let mut handler = create_test_handler();
    let response = handler
        .handle_request(JsonRpcRequest::new("req-1", "prompts/list", Value::Null))
        .await
        .unwrap();

    assert_eq!(response.id, Some(JsonRpcId::String("req-1".to_string())));
    assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
}

// -----------------------------------------------------------------------------
// Stdio loop
// -----------------------------------------------------------------------------

#[tokio::test]
async fn test_stdio_exchange() {
    let dispatcher = dispatcher(MockAuthenticator::new(MockClusterApi::with_namespaces(&["default"])));
    let mut server = McpStdioServer::new(Arc::new(dispatcher));

    let input = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-06-18"}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "this is not json",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"does_not_exist","arguments":{}}}"#,
        "",
    ]
    .join("\n");

    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-06-18");
    assert_eq!(responses[1]["id"], Value::Null);
    assert_eq!(responses[1]["error"]["code"], -32700);
    assert_eq!(responses[2]["id"], 2);
    assert_eq!(responses[2]["result"]["isError"], true);

    let text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Unknown tool: does_not_exist"));
}
