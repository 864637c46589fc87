//! DillyDally Backend Client
//!
//! Client library for the DillyDally activity backend (a Convex deployment).
//! The Dedalus MCP server uses it to fetch sessions, activity snapshots and
//! productivity metrics on behalf of its tools.
//!
//! ## Overview
//!
//! - **Backend trait**: [`Backend`] abstracts the read-only queries the tools need
//! - **HTTP client**: [`ConvexClient`] implements it over `POST /api/query`
//! - **Records**: typed views of the documents the backend returns
//!
//! ## Usage
//!
//! ```no_run
//! use dedalus_client::{Backend, ConvexClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ConvexClient::new("https://example.convex.cloud")?;
//!
//!     let sessions = client.all_sessions().await?;
//!     println!("Found {} sessions", sessions.len());
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod records;

// Re-export main types for convenience
pub use backend::{Backend, Unconfigured};
pub use connection::ConvexClient;
pub use error::{ClientError, ClientResult};
pub use records::{
    AttentionMetrics, CameraSnapshot, SessionMetadata, SessionSummary, Snapshot, User,
    WeeklyInsights,
};
