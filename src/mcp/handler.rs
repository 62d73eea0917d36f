//! MCP Request Handler
//!
//! Routes JSON-RPC methods to protocol handlers. `tools/call` is delegated to the
//! [`Dispatcher`]; its envelope is returned as pretty-printed JSON text.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::mcp::error::McpError;
use crate::mcp::protocol::{
    ContentBlock, InitializeParams, InitializeResult, JsonRpcError, JsonRpcId, JsonRpcRequest,
    JsonRpcResponse, ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult, ToolsListResult,
    DEFAULT_VERSION, SUPPORTED_VERSIONS,
};
use crate::tools::Dispatcher;

pub struct McpHandler {
    dispatcher: Arc<Dispatcher>,
    protocol_version: Option<String>,
}

impl McpHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher, protocol_version: None }
    }

    /// Version agreed during `initialize`, if any
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Handle one message; notifications produce no response
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, id = ?request.id, "Handling MCP request");

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        let id = request.id.clone();
        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            method => Err(McpError::MethodNotFound(method.to_string())),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => error_response(id, err),
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => debug!("Client cancelled a request"),
            other => debug!(method = %other, "Ignoring notification"),
        }
    }

    fn handle_initialize(&mut self, params: Value) -> Result<Value, McpError> {
        let params: InitializeParams = if params.is_null() {
            InitializeParams::default()
        } else {
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?
        };

        let requested =
            if params.protocol_version.is_empty() { DEFAULT_VERSION } else { params.protocol_version.as_str() };
        let version = negotiate_version(requested)?;

        info!(
            client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
            requested = %requested,
            negotiated = %version,
            "MCP session initialized"
        );
        self.protocol_version = Some(version.to_string());

        let result = InitializeResult {
            protocol_version: version.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo { name: crate::APP_NAME.to_string(), version: crate::VERSION.to_string() },
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> Result<Value, McpError> {
        let tools = self.dispatcher.registry().to_mcp_tools();
        debug!(count = tools.len(), "Listing tools");
        Ok(serde_json::to_value(ToolsListResult { tools, next_cursor: None })?)
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, McpError> {
        let params: ToolCallParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let response = self.dispatcher.execute(&params.name, params.arguments.unwrap_or(Value::Null)).await;
        let text = serde_json::to_string_pretty(&response)?;

        let result = ToolCallResult {
            content: vec![ContentBlock::Text { text }],
            is_error: Some(!response.success),
        };
        Ok(serde_json::to_value(result)?)
    }
}

/// Pick the version to speak with a client requesting `requested`.
///
/// Answers with the newest supported version not after `requested`. Requests older
/// than every supported version are rejected.
pub fn negotiate_version(requested: &str) -> Result<&'static str, McpError> {
    // Versions are ISO dates, so lexical order is chronological
    SUPPORTED_VERSIONS
        .iter()
        .rev()
        .find(|v| **v <= requested)
        .copied()
        .ok_or_else(|| McpError::UnsupportedProtocolVersion { client: requested.to_string() })
}

fn error_response(id: Option<JsonRpcId>, err: McpError) -> JsonRpcResponse {
    match &err {
        McpError::MethodNotFound(method) => warn!(method = %method, "Method not found"),
        McpError::InternalError(_) | McpError::SerializationError(_) | McpError::IoError(_) => {
            error!(error = %err, "Internal MCP error")
        }
        _ => warn!(error = %err, "MCP request failed"),
    }
    JsonRpcResponse::failure(id, JsonRpcError::from(err))
}
