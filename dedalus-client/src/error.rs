//! Error types for the DillyDally backend client

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// No backend URL was configured
    #[error(
        "CONVEX_URL environment variable is not set. Please set it in the environment \
         or pass --backend-url to point at the DillyDally deployment."
    )]
    NotConfigured,

    /// Connection error
    #[error("Connection failed to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// The backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status} for {function}")]
    HttpStatus { function: String, status: u16 },

    /// Backend function returned an error
    #[error("Query {function} failed: {message}")]
    QueryFailed { function: String, message: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a connection failed error
    pub fn connection_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a query failed error
    pub fn query_failed(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryFailed {
            function: function.into(),
            message: message.into(),
        }
    }
}
