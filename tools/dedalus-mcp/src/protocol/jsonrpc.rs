//! JSON-RPC 2.0 types
//!
//! See: https://www.jsonrpc.org/specification

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only protocol version accepted on the wire
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request
///
/// A request without `id` is a notification and never gets a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID (string or number)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Method name
    pub method: String,
    /// Method parameters (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response (success)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID (must match request)
    pub id: Value,
    /// Result value
    pub result: Value,
}

/// JSON-RPC 2.0 error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorResponse {
    /// JSON-RPC version (must be "2.0")
    pub jsonrpc: String,
    /// Request ID (must match request, or null if parse error)
    pub id: Value,
    /// Error object
    pub error: JsonRpcError,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Either kind of reply, serialized without a wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcReply {
    Success(JsonRpcResponse),
    Error(JsonRpcErrorResponse),
}

impl JsonRpcRequest {
    /// Create a new request
    pub fn new(id: Value, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    /// Create a notification (no `id`)
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: None,
            method: method.into(),
            params,
        }
    }

    /// Whether the sender expects no reply
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl JsonRpcResponse {
    /// Create a new success response
    pub fn new(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result,
        }
    }
}

impl JsonRpcErrorResponse {
    /// Create a new error response
    pub fn new(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }
}

impl JsonRpcError {
    /// Create a new error
    pub fn new(code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            code,
            message,
            data,
        }
    }
}

impl JsonRpcReply {
    /// Success reply
    pub fn success(id: Value, result: Value) -> Self {
        JsonRpcReply::Success(JsonRpcResponse::new(id, result))
    }

    /// Error reply
    pub fn error(id: Value, error: JsonRpcError) -> Self {
        JsonRpcReply::Error(JsonRpcErrorResponse::new(id, error))
    }

    /// The request id this reply answers
    pub fn id(&self) -> &Value {
        match self {
            JsonRpcReply::Success(resp) => &resp.id,
            JsonRpcReply::Error(resp) => &resp.id,
        }
    }

    /// Whether this is an error reply
    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcReply::Error(_))
    }
}

/// A decoded inbound payload: one message or a batch
///
/// Elements stay as raw JSON so one malformed batch entry only fails itself.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    Single(Value),
    Batch(Vec<Value>),
}

impl IncomingMessage {
    /// Parse wire text, producing a `-32700` reply for invalid JSON
    pub fn parse(text: &str) -> Result<Self, JsonRpcReply> {
        Self::parse_slice(text.as_bytes())
    }

    /// Parse raw bytes; invalid UTF-8 is a parse error like any other
    pub fn parse_slice(bytes: &[u8]) -> Result<Self, JsonRpcReply> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Array(items)) => Ok(IncomingMessage::Batch(items)),
            Ok(value) => Ok(IncomingMessage::Single(value)),
            Err(e) => Err(JsonRpcReply::error(
                Value::Null,
                JsonRpcError::new(-32700, format!("Parse error: {}", e), None),
            )),
        }
    }

    /// The first element's method, when it decodes as a request
    pub fn first_method(&self) -> Option<&str> {
        let first = match self {
            IncomingMessage::Single(value) => value,
            IncomingMessage::Batch(items) => items.first()?,
        };
        first.get("method").and_then(Value::as_str)
    }
}

/// Outbound payload mirroring the shape of the request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    Single(JsonRpcReply),
    Batch(Vec<JsonRpcReply>),
}

impl OutgoingMessage {
    /// All replies, in order
    pub fn replies(&self) -> &[JsonRpcReply] {
        match self {
            OutgoingMessage::Single(reply) => std::slice::from_ref(reply),
            OutgoingMessage::Batch(replies) => replies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_notification_has_no_id() {
        let req: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(req.is_notification());
        assert!(req.params.is_none());
    }

    #[test]
    fn test_reply_serializes_flat() {
        let reply = JsonRpcReply::error(
            json!(7),
            JsonRpcError::new(-32601, "Method not found: x".to_string(), None),
        );
        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
        assert!(value["error"].get("data").is_none());
    }

    #[test]
    fn test_parse_batch_and_garbage() {
        let msg = IncomingMessage::parse(r#"[{"jsonrpc":"2.0","id":1,"method":"ping"}]"#).unwrap();
        assert!(matches!(msg, IncomingMessage::Batch(ref items) if items.len() == 1));
        assert_eq!(msg.first_method(), Some("ping"));

        let err = IncomingMessage::parse("{not json").unwrap_err();
        assert!(err.is_error());
        assert_eq!(err.id(), &Value::Null);
    }

    #[test]
    fn test_string_ids_preserved() {
        let reply = JsonRpcReply::success(json!("abc"), json!({}));
        assert_eq!(reply.id(), &json!("abc"));
        assert!(!reply.is_error());
    }
}
