//! Transports carrying JSON-RPC traffic to [`McpServer`](crate::McpServer)
//!
//! - [`stdio`]: NDJSON over stdin/stdout, one server for the whole process
//! - [`http`]: axum endpoint with one server per session

pub mod http;
pub mod session;
pub mod stdio;

pub use http::{router, serve, HttpState, SESSION_HEADER};
pub use session::{RequestGuard, Session, SessionId, SessionStore};
pub use stdio::{run_stdio, StdioTransport};
