//! Dedalus MCP Server
//!
//! Model Context Protocol (MCP) server exposing DillyDally focus-session data
//! to Large Language Models as callable tools.
//!
//! # Architecture
//!
//! ```text
//! LLM Host (Claude Desktop, IDE, web agent)
//!   ↓ stdio (NDJSON) or HTTP POST /mcp (JSON-RPC 2.0)
//! transport ─ session store (HTTP only, one McpServer per session)
//!   ↓
//! McpServer → Dispatcher → ToolRegistry
//!   ↓ dedalus-client
//! DillyDally backend (Convex HTTP API)
//! ```
//!
//! # MCP Protocol
//!
//! - **Transports**: stdio with NDJSON, HTTP with `mcp-session-id` sessions
//! - **Protocol**: JSON-RPC 2.0, batches accepted
//! - **Version**: 2025-06-18 (2024-11-05 and 2025-03-26 also accepted)
//! - **Capabilities**: Tools (13)

pub mod config;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod tools;
pub mod transport;

pub use config::{Config, HttpConfig, TransportMode};
pub use dispatch::{DispatchError, Dispatcher};
pub use error::{McpError, McpResult};
pub use registry::{Tool, ToolError, ToolRegistry};
pub use server::{McpServer, ServerState};
pub use tools::builtin_registry;
pub use transport::{HttpState, SessionStore, StdioTransport};
