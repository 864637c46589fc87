//! Backend query wire format
//!
//! The DillyDally backend is a Convex deployment. Read-only functions are
//! invoked with `POST {url}/api/query`:
//!
//! ```json
//! { "path": "functions:getAllSessions", "args": {}, "format": "json" }
//! ```
//!
//! and answer with either `{"status":"success","value":...}` or
//! `{"status":"error","errorMessage":"..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Module that holds every query function the MCP tools use
pub const FUNCTIONS_MODULE: &str = "functions";

/// Query function names
pub mod functions {
    pub const CURRENT_USER: &str = "currentUser";
    pub const GET_ALL_SESSIONS: &str = "getAllSessions";
    pub const GET_SESSION_SNAPSHOTS: &str = "getSessionSnapshots";
    pub const GET_SESSION_METADATA: &str = "getSessionMetadata";
    pub const GET_SESSION_ACTIVITIES: &str = "getSessionActivities";
    pub const GET_SESSION_CAMERA_SNAPSHOTS: &str = "getSessionCameraSnapshots";
    pub const GET_ATTENTION_METRICS: &str = "getAttentionMetrics";
    pub const GET_WEEKLY_INSIGHTS: &str = "getWeeklyInsights";
}

/// Body of a query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// `module:function` path
    pub path: String,
    /// Function arguments (always an object)
    pub args: Value,
    /// Result encoding; always `"json"`
    pub format: String,
}

impl QueryRequest {
    /// Build a request for a function in [`FUNCTIONS_MODULE`]
    pub fn new(function: &str, args: Value) -> Self {
        Self {
            path: format!("{}:{}", FUNCTIONS_MODULE, function),
            args,
            format: "json".to_string(),
        }
    }
}

/// Body of a query response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryResponse {
    Success {
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl QueryResponse {
    /// Extract the value or the backend's error message
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            QueryResponse::Success { value } => Ok(value),
            QueryResponse::Error { error_message } => Err(error_message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_request_path() {
        let req = QueryRequest::new(functions::GET_ALL_SESSIONS, json!({}));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["path"], "functions:getAllSessions");
        assert_eq!(value["format"], "json");
    }

    #[test]
    fn test_query_response_error() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"status":"error","errorMessage":"boom"}"#).unwrap();
        assert_eq!(resp.into_result().unwrap_err(), "boom");
    }

    #[test]
    fn test_query_response_success_null() {
        let resp: QueryResponse =
            serde_json::from_str(r#"{"status":"success","value":null}"#).unwrap();
        assert_eq!(resp.into_result().unwrap(), Value::Null);
    }
}
