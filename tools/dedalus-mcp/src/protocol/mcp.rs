//! MCP protocol-specific types
//!
//! Model Context Protocol version 2025-06-18

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol version (preferred)
pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

/// Supported MCP protocol versions
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Method names handled by the server
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const CANCELLED: &str = "notifications/cancelled";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client
    pub protocol_version: String,
    /// Client capabilities
    #[serde(default)]
    pub capabilities: Value,
    /// Client info
    pub client_info: ClientInfo,
}

/// Client info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name
    pub name: String,
    /// Client version
    pub version: String,
}

/// Initialize response result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol version supported by server
    pub protocol_version: String,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Server info
    pub server_info: ServerInfo,
}

/// Server capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Tools capability (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tools capability
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Whether the tool list can change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Server info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

/// Tool definition as advertised by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (unique registry key)
    pub name: String,
    /// Tool description
    pub description: String,
    /// Input schema (JSON Schema)
    pub input_schema: Value,
}

/// Tools list result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    /// Available tools
    pub tools: Vec<ToolDefinition>,
}

/// Tool call parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Tool name
    pub name: String,
    /// Tool arguments (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
}

/// Tool call result
///
/// An error result always carries at least one non-empty text block, and a
/// successful result is never empty. The constructors are the only way to
/// build one, so the type is serialize-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Tool execution result content
    content: Vec<ToolContent>,
    /// Whether the tool call failed
    is_error: bool,
}

impl ToolCallResult {
    /// Successful result with a single text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Failed result explaining what went wrong
    pub fn error(message: impl Into<String>) -> Self {
        let mut text = message.into();
        if text.trim().is_empty() {
            text = "Tool call failed".to_string();
        }
        Self {
            content: vec![ToolContent::Text { text }],
            is_error: true,
        }
    }

    /// Content blocks in order
    pub fn content(&self) -> &[ToolContent] {
        &self.content
    }

    /// Whether the tool call failed
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Concatenated text of all text blocks
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|ToolContent::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tool content item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
#[serde(rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content
    Text { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_call_result_wire_shape() {
        let value = serde_json::to_value(ToolCallResult::text("Result: 8")).unwrap();
        assert_eq!(
            value,
            json!({
                "content": [{ "type": "text", "text": "Result: 8" }],
                "isError": false
            })
        );
    }

    #[test]
    fn test_error_result_never_empty() {
        let result = ToolCallResult::error("   ");
        assert!(result.is_error());
        assert_eq!(result.text_content(), "Tool call failed");
    }

    #[test]
    fn test_initialize_params_accept_missing_capabilities() {
        let params: InitializeParams = serde_json::from_value(json!({
            "protocolVersion": "2024-11-05",
            "clientInfo": { "name": "test-client", "version": "1.0.0" }
        }))
        .unwrap();
        assert_eq!(params.client_info.name, "test-client");
        assert!(params.capabilities.is_null());
    }

    #[test]
    fn test_tool_definition_camel_case() {
        let def = ToolDefinition {
            name: "t".to_string(),
            description: "d".to_string(),
            input_schema: json!({ "type": "object" }),
        };
        let value = serde_json::to_value(def).unwrap();
        assert!(value.get("inputSchema").is_some());
    }
}
