//! Backend abstraction
//!
//! The MCP tools only depend on [`Backend`], so tests can swap the HTTP
//! client for an in-memory implementation.

use crate::error::{ClientError, ClientResult};
use crate::records::{
    AttentionMetrics, CameraSnapshot, SessionMetadata, SessionSummary, Snapshot, User,
    WeeklyInsights,
};
use async_trait::async_trait;

/// Read-only access to DillyDally activity data
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// The authenticated user, if any
    async fn current_user(&self) -> ClientResult<Option<User>>;

    /// All sessions of the current user, newest first
    async fn all_sessions(&self) -> ClientResult<Vec<SessionSummary>>;

    /// Snapshots recorded during a session (unordered)
    async fn session_snapshots(&self, session_id: &str) -> ClientResult<Vec<Snapshot>>;

    /// Aggregated statistics for a session
    async fn session_metadata(&self, session_id: &str) -> ClientResult<Option<SessionMetadata>>;

    /// Distinct activity names seen during a session
    async fn session_activities(&self, session_id: &str) -> ClientResult<Vec<String>>;

    /// Camera face-tracking samples of a session
    async fn session_camera_snapshots(&self, session_id: &str) -> ClientResult<Vec<CameraSnapshot>>;

    /// Attention statistics for a session, or the most recent one when
    /// `session_id` is `None`. `None` when the user has no sessions.
    async fn attention_metrics(
        &self,
        session_id: Option<&str>,
    ) -> ClientResult<Option<AttentionMetrics>>;

    /// Weekly summary, `None` when the user is not authenticated
    async fn weekly_insights(&self) -> ClientResult<Option<WeeklyInsights>>;
}

/// Backend used when no deployment URL is configured
///
/// Every call fails with [`ClientError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

#[async_trait]
impl Backend for Unconfigured {
    async fn current_user(&self) -> ClientResult<Option<User>> {
        Err(ClientError::NotConfigured)
    }

    async fn all_sessions(&self) -> ClientResult<Vec<SessionSummary>> {
        Err(ClientError::NotConfigured)
    }

    async fn session_snapshots(&self, _session_id: &str) -> ClientResult<Vec<Snapshot>> {
        Err(ClientError::NotConfigured)
    }

    async fn session_metadata(&self, _session_id: &str) -> ClientResult<Option<SessionMetadata>> {
        Err(ClientError::NotConfigured)
    }

    async fn session_activities(&self, _session_id: &str) -> ClientResult<Vec<String>> {
        Err(ClientError::NotConfigured)
    }

    async fn session_camera_snapshots(&self, _session_id: &str) -> ClientResult<Vec<CameraSnapshot>> {
        Err(ClientError::NotConfigured)
    }

    async fn attention_metrics(
        &self,
        _session_id: Option<&str>,
    ) -> ClientResult<Option<AttentionMetrics>> {
        Err(ClientError::NotConfigured)
    }

    async fn weekly_insights(&self) -> ClientResult<Option<WeeklyInsights>> {
        Err(ClientError::NotConfigured)
    }
}
