//! Error types for the MCP server

use crate::protocol::JsonRpcError;
use thiserror::Error;

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

/// JSON-RPC error codes used by the server
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const CONNECTION_CLOSED: i32 = -32000;
}

/// Errors that can occur in the MCP server
#[derive(Debug, Error)]
pub enum McpError {
    /// IO error (stdin/stdout, socket)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed JSON on the wire
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid JSON-RPC request
    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Requested tool is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// The server instance has been closed
    #[error("Connection closed")]
    ConnectionClosed,

    /// Two tools were registered under the same name
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),
}

impl McpError {
    /// Convert error to JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            McpError::Parse(_) | McpError::Json(_) => codes::PARSE_ERROR,
            McpError::InvalidRequest(_) => codes::INVALID_REQUEST,
            McpError::MethodNotFound(_) | McpError::UnknownTool(_) => codes::METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => codes::INVALID_PARAMS,
            McpError::ConnectionClosed => codes::CONNECTION_CLOSED,
            _ => codes::INTERNAL_ERROR,
        }
    }

    /// Get error message for JSON-RPC response
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Build the wire error object
    pub fn to_jsonrpc(&self) -> JsonRpcError {
        JsonRpcError::new(self.error_code(), self.message(), None)
    }
}
