//! MCP tools implementation
//!
//! `add_integers` plus read-only tools over DillyDally focus-session data.
//! Backend tools report backend failures as `isError` results and empty data
//! as a plain message.

use crate::error::McpResult;
use crate::registry::ToolRegistry;
use dedalus_client::Backend;
use std::sync::Arc;

pub mod activity;
pub mod arithmetic;
pub mod attention;
pub mod format;
pub mod sessions;
pub mod user;

pub use activity::{GetProductivityStats, GetRecentActivity, GetWeeklyInsights};
pub use arithmetic::AddIntegers;
pub use attention::{GetAttentionMetrics, GetSessionCameraSnapshots};
pub use sessions::{
    GetAllSessions, GetLastSession, GetSessionActivities, GetSessionDetails, GetSessionMetadata,
    GetSessionSnapshots,
};
pub use user::GetCurrentUser;

/// Registry with every built-in tool, in listing order
pub fn builtin_registry(backend: Arc<dyn Backend>) -> McpResult<ToolRegistry> {
    ToolRegistry::builder()
        .register(AddIntegers)
        .register(GetCurrentUser::new(Arc::clone(&backend)))
        .register(GetAllSessions::new(Arc::clone(&backend)))
        .register(GetLastSession::new(Arc::clone(&backend)))
        .register(GetSessionDetails::new(Arc::clone(&backend)))
        .register(GetSessionMetadata::new(Arc::clone(&backend)))
        .register(GetSessionSnapshots::new(Arc::clone(&backend)))
        .register(GetSessionActivities::new(Arc::clone(&backend)))
        .register(GetRecentActivity::new(Arc::clone(&backend)))
        .register(GetProductivityStats::new(Arc::clone(&backend)))
        .register(GetAttentionMetrics::new(Arc::clone(&backend)))
        .register(GetSessionCameraSnapshots::new(Arc::clone(&backend)))
        .register(GetWeeklyInsights::new(backend))
        .build()
}
