//! MCP server implementation
//!
//! One [`McpServer`] serves one logical connection: the whole process in
//! stdio mode, one session in HTTP mode. It owns the protocol lifecycle and
//! translates every failure into a JSON-RPC error envelope.

use crate::dispatch::Dispatcher;
use crate::error::{McpError, McpResult};
use crate::protocol::{
    methods, ClientInfo, IncomingMessage, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcReply, JsonRpcRequest, OutgoingMessage, ServerCapabilities, ServerInfo, ToolCallParams,
    ToolCallResult, ToolDefinition, ToolsCapability, ToolsListResult, JSONRPC_VERSION,
    MCP_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::registry::ToolRegistry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "dedalus-mcp";

/// MCP server state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Constructed with capabilities declared; serving requests
    Initialized,
    /// Closed; every request fails with `ConnectionClosed`
    Closed,
}

/// MCP server
#[derive(Debug)]
pub struct McpServer {
    state: ServerState,
    dispatcher: Dispatcher,
    /// Tool list captured at construction, served verbatim by `tools/list`
    tools: Vec<ToolDefinition>,
    client_info: Option<ClientInfo>,
    protocol_version: Option<String>,
}

impl McpServer {
    /// Create a server bound to `registry`
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        let tools = registry.definitions();
        Self {
            state: ServerState::Initialized,
            dispatcher: Dispatcher::new(registry),
            tools,
            client_info: None,
            protocol_version: None,
        }
    }

    /// Get current server state
    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Whether the server has been closed
    pub fn is_closed(&self) -> bool {
        self.state == ServerState::Closed
    }

    /// Whether a client completed the `initialize` handshake
    pub fn is_handshake_complete(&self) -> bool {
        self.client_info.is_some()
    }

    /// Client that performed the handshake
    pub fn client_info(&self) -> Option<&ClientInfo> {
        self.client_info.as_ref()
    }

    /// Negotiated protocol version
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Transition to `Closed`; idempotent
    pub fn close(&mut self) {
        if self.state != ServerState::Closed {
            debug!("🔒 Closing MCP server instance");
            self.state = ServerState::Closed;
        }
    }

    fn ensure_open(&self) -> McpResult<()> {
        match self.state {
            ServerState::Initialized => Ok(()),
            ServerState::Closed => Err(McpError::ConnectionClosed),
        }
    }

    /// Handle MCP initialize request
    ///
    /// Negotiates the protocol version: a supported requested version is
    /// echoed, anything else is answered with [`MCP_PROTOCOL_VERSION`].
    pub fn handle_initialize(&mut self, params: InitializeParams) -> McpResult<InitializeResult> {
        self.ensure_open()?;

        let version = if SUPPORTED_PROTOCOL_VERSIONS.contains(&params.protocol_version.as_str()) {
            params.protocol_version.clone()
        } else {
            warn!(
                "⚠️  Client requested unsupported protocol {}, offering {}",
                params.protocol_version, MCP_PROTOCOL_VERSION
            );
            MCP_PROTOCOL_VERSION.to_string()
        };

        info!(
            "🔌 Initialized by {} {} (protocol {})",
            params.client_info.name, params.client_info.version, version
        );

        self.client_info = Some(params.client_info);
        self.protocol_version = Some(version.clone());

        Ok(InitializeResult {
            protocol_version: version,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Handle tools/list request
    ///
    /// Returns the list of available tools with their schemas.
    pub fn list_capabilities(&self) -> McpResult<ToolsListResult> {
        self.ensure_open()?;
        debug!("📋 Listing {} tools", self.tools.len());
        Ok(ToolsListResult {
            tools: self.tools.clone(),
        })
    }

    /// Handle tools/call request
    pub async fn invoke(&self, params: ToolCallParams) -> McpResult<ToolCallResult> {
        self.ensure_open()?;
        let result = self
            .dispatcher
            .dispatch(&params.name, params.arguments)
            .await?;
        Ok(result)
    }

    /// Handle one decoded inbound payload
    ///
    /// Returns `None` when nothing must be sent back (notifications only).
    pub async fn handle_message(&mut self, message: IncomingMessage) -> Option<OutgoingMessage> {
        match message {
            IncomingMessage::Single(value) => {
                self.handle_value(value).await.map(OutgoingMessage::Single)
            }
            IncomingMessage::Batch(items) if items.is_empty() => Some(OutgoingMessage::Single(
                JsonRpcReply::error(Value::Null, invalid_request("empty batch")),
            )),
            IncomingMessage::Batch(items) => {
                let mut replies = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(reply) = self.handle_value(item).await {
                        replies.push(reply);
                    }
                }
                if replies.is_empty() {
                    None
                } else {
                    Some(OutgoingMessage::Batch(replies))
                }
            }
        }
    }

    /// Handle one raw JSON-RPC message
    pub async fn handle_value(&mut self, value: Value) -> Option<JsonRpcReply> {
        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("❌ Invalid JSON-RPC message: {}", e);
                Some(JsonRpcReply::error(id, invalid_request(&e.to_string())))
            }
        }
    }

    /// Handle a JSON-RPC request or notification
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcReply> {
        let JsonRpcRequest {
            jsonrpc,
            id,
            method,
            params,
        } = request;

        let Some(id) = id else {
            self.handle_notification(&method);
            return None;
        };

        if jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcReply::error(
                id,
                invalid_request(&format!(
                    "Invalid JSON-RPC version: expected 2.0, got {}",
                    jsonrpc
                )),
            ));
        }

        debug!("🎯 Method: {}, ID: {}", method, id);

        let outcome = match method.as_str() {
            methods::INITIALIZE => match decode_params::<InitializeParams>(params) {
                Ok(params) => self.handle_initialize(params).and_then(to_value),
                Err(e) => Err(e),
            },
            methods::PING => self.ensure_open().map(|_| json!({})),
            methods::TOOLS_LIST => self.list_capabilities().and_then(to_value),
            methods::TOOLS_CALL => match decode_params::<ToolCallParams>(params) {
                Ok(params) => self.invoke(params).await.and_then(to_value),
                Err(e) => Err(e),
            },
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Some(match outcome {
            Ok(result) => JsonRpcReply::success(id, result),
            Err(e) => {
                match &e {
                    McpError::Internal(_) | McpError::Json(_) | McpError::Io(_) => {
                        tracing::error!("[MCP Error] {} failed: {}", method, e)
                    }
                    _ => warn!("⚠️  {} failed: {}", method, e),
                }
                JsonRpcReply::error(id, e.to_jsonrpc())
            }
        })
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            methods::INITIALIZED => debug!("✅ Client confirmed initialization"),
            methods::CANCELLED => {
                debug!("🚫 Cancellation notice ignored (tool calls run to completion)")
            }
            other => debug!("📭 Ignoring notification: {}", other),
        }
    }
}

fn decode_params<T: DeserializeOwned>(params: Option<Value>) -> McpResult<T> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_value<T: Serialize>(result: T) -> McpResult<Value> {
    serde_json::to_value(result).map_err(|e| McpError::Internal(e.to_string()))
}

fn invalid_request(detail: &str) -> JsonRpcError {
    McpError::InvalidRequest(detail.to_string()).to_jsonrpc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Tool, ToolError};
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Pair {
        a: f64,
        b: f64,
    }

    struct Add;

    #[async_trait]
    impl Tool for Add {
        type Args = Pair;

        fn name(&self) -> &'static str {
            "add"
        }

        fn description(&self) -> &'static str {
            "Adds"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "required": ["a", "b"] })
        }

        async fn call(&self, args: Pair) -> Result<ToolCallResult, ToolError> {
            Ok(ToolCallResult::text(format!("Result: {}", args.a + args.b)))
        }
    }

    fn server() -> McpServer {
        let registry = ToolRegistry::builder().register(Add).build().unwrap();
        McpServer::new(Arc::new(registry))
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(json!(id), method, params)
    }

    fn result_of(reply: Option<JsonRpcReply>) -> Value {
        match reply {
            Some(JsonRpcReply::Success(resp)) => resp.result,
            other => panic!("expected success, got {:?}", other),
        }
    }

    fn error_of(reply: Option<JsonRpcReply>) -> JsonRpcError {
        match reply {
            Some(JsonRpcReply::Error(resp)) => resp.error,
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_initialize_echoes_supported_version() {
        let mut server = server();
        let result = result_of(
            server
                .handle_request(request(
                    1,
                    "initialize",
                    Some(json!({
                        "protocolVersion": "2024-11-05",
                        "capabilities": {},
                        "clientInfo": { "name": "test-client", "version": "1.0.0" }
                    })),
                ))
                .await,
        );

        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(server.is_handshake_complete());
    }

    #[tokio::test]
    async fn test_initialize_unsupported_version_gets_preferred() {
        let mut server = server();
        let result = result_of(
            server
                .handle_request(request(
                    1,
                    "initialize",
                    Some(json!({
                        "protocolVersion": "1999-01-01",
                        "clientInfo": { "name": "old", "version": "0" }
                    })),
                ))
                .await,
        );
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_initialize_invalid_params() {
        let mut server = server();
        let error = error_of(
            server
                .handle_request(request(1, "initialize", Some(json!({ "foo": 1 }))))
                .await,
        );
        assert_eq!(error.code, -32602);
        assert!(!server.is_handshake_complete());
    }

    #[tokio::test]
    async fn test_tools_list_stable() {
        let mut server = server();
        let first = result_of(server.handle_request(request(1, "tools/list", None)).await);
        let second = result_of(server.handle_request(request(2, "tools/list", None)).await);
        assert_eq!(first, second);
        assert_eq!(first["tools"][0]["name"], "add");
        assert!(first["tools"][0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let mut server = server();
        let result = result_of(
            server
                .handle_request(request(
                    3,
                    "tools/call",
                    Some(json!({ "name": "add", "arguments": { "a": 5, "b": 3 } })),
                ))
                .await,
        );
        assert_eq!(result["content"][0]["text"], "Result: 8");
        assert_eq!(result["isError"], false);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found() {
        let mut server = server();
        let error = error_of(
            server
                .handle_request(request(
                    4,
                    "tools/call",
                    Some(json!({ "name": "nonexistent", "arguments": {} })),
                ))
                .await,
        );
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_validation_failure_is_not_protocol_error() {
        let mut server = server();
        let result = result_of(
            server
                .handle_request(request(
                    5,
                    "tools/call",
                    Some(json!({ "name": "add", "arguments": { "a": "five", "b": 3 } })),
                ))
                .await,
        );
        assert_eq!(result["isError"], true);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server();
        let error = error_of(server.handle_request(request(6, "resources/list", None)).await);
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("resources/list"));
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let mut server = server();
        let reply = server
            .handle_request(JsonRpcRequest::notification("notifications/initialized", None))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_closed_server_rejects_requests() {
        let mut server = server();
        server.close();
        assert_eq!(server.state(), ServerState::Closed);

        let error = error_of(server.handle_request(request(7, "tools/list", None)).await);
        assert_eq!(error.code, -32000);

        let error = error_of(server.handle_request(request(8, "ping", None)).await);
        assert_eq!(error.code, -32000);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut server = server();
        let mut req = request(9, "ping", None);
        req.jsonrpc = "1.0".to_string();
        let error = error_of(server.handle_request(req).await);
        assert_eq!(error.code, -32600);
    }

    #[tokio::test]
    async fn test_batch_skips_notifications() {
        let mut server = server();
        let reply = server
            .handle_message(IncomingMessage::Batch(vec![
                json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
                json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
                json!({ "jsonrpc": "2.0", "id": 2 }),
            ]))
            .await
            .unwrap();

        let replies = reply.replies();
        assert_eq!(replies.len(), 2);
        assert!(!replies[0].is_error());
        assert!(replies[1].is_error());
        assert_eq!(replies[1].id(), &json!(2));
    }

    #[tokio::test]
    async fn test_empty_batch_is_invalid() {
        let mut server = server();
        let reply = server
            .handle_message(IncomingMessage::Batch(Vec::new()))
            .await
            .unwrap();
        assert!(reply.replies()[0].is_error());
    }
}
