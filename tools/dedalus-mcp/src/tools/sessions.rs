//! Session tools (get_all_sessions, get_last_session, get_session_details,
//! get_session_metadata, get_session_snapshots, get_session_activities)

use super::format::{
    duration, fetch_error, iso_time, number, percent, readable_time, share, sort_chronologically,
    titled, SnapshotView,
};
use super::user::NoParams;
use crate::protocol::ToolCallResult;
use crate::registry::{Tool, ToolError};
use async_trait::async_trait;
use dedalus_client::{Backend, Snapshot};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Arguments of the per-session tools
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    pub session_id: String,
}

pub(super) fn session_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "sessionId": { "type": "string", "description": description }
        },
        "required": ["sessionId"]
    })
}

fn no_params_schema() -> Value {
    json!({ "type": "object", "properties": {}, "required": [] })
}

fn productive_count(snapshots: &[Snapshot]) -> usize {
    snapshots.iter().filter(|s| s.is_productive).count()
}

/// First and last timestamp of chronologically sorted snapshots
fn span(sorted: &[Snapshot]) -> (f64, f64) {
    let start = sorted.first().map(|s| s.timestamp).unwrap_or_default();
    let end = sorted.last().map(|s| s.timestamp).unwrap_or_default();
    (start, end)
}

// ════════════════════════════════════════════════════════════════════
// get_all_sessions
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    session_id: String,
    created_at: String,
    readable_created_at: String,
    duration: String,
    duration_ms: Value,
    activity_count: Value,
    snapshot_count: Value,
    productivity_percentage: String,
}

pub struct GetAllSessions {
    backend: Arc<dyn Backend>,
}

impl GetAllSessions {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetAllSessions {
    type Args = NoParams;

    fn name(&self) -> &'static str {
        "get_all_sessions"
    }

    fn description(&self) -> &'static str {
        "Get all DillyDally sessions for the current user. Returns a list of sessions with metadata including duration, creation time, and basic stats."
    }

    fn input_schema(&self) -> Value {
        no_params_schema()
    }

    async fn call(&self, _args: NoParams) -> Result<ToolCallResult, ToolError> {
        let sessions = match self.backend.all_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => return Ok(fetch_error("all sessions", &e)),
        };

        if sessions.is_empty() {
            return Ok(ToolCallResult::text("No sessions found."));
        }

        let views: Vec<SessionView> = sessions
            .iter()
            .map(|session| SessionView {
                session_id: session.id.clone(),
                created_at: iso_time(session.creation_time),
                readable_created_at: readable_time(session.creation_time),
                duration: duration(session.duration),
                duration_ms: number(session.duration),
                activity_count: number(session.activity_count),
                snapshot_count: number(session.snapshot_count),
                productivity_percentage: percent(session.productivity_percentage),
            })
            .collect();

        titled(&format!("Found {} sessions", views.len()), &views)
    }
}

// ════════════════════════════════════════════════════════════════════
// get_last_session
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LastSessionView {
    session_id: String,
    start_time: String,
    readable_start_time: String,
    end_time: String,
    readable_end_time: String,
    snapshot_count: usize,
    productivity_percentage: String,
    productive_snapshots: usize,
    non_productive_snapshots: usize,
    snapshots: Vec<SnapshotView>,
}

pub struct GetLastSession {
    backend: Arc<dyn Backend>,
}

impl GetLastSession {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetLastSession {
    type Args = NoParams;

    fn name(&self) -> &'static str {
        "get_last_session"
    }

    fn description(&self) -> &'static str {
        "Get details of the most recent DillyDally session, including all snapshots, activity summary, and session metadata."
    }

    fn input_schema(&self) -> Value {
        no_params_schema()
    }

    async fn call(&self, _args: NoParams) -> Result<ToolCallResult, ToolError> {
        const WHAT: &str = "last session";

        let sessions = match self.backend.all_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => return Ok(fetch_error(WHAT, &e)),
        };

        // Sessions arrive newest first
        let Some(latest) = sessions.first() else {
            return Ok(ToolCallResult::text("No sessions found."));
        };
        debug!("🕘 Most recent session: {}", latest.id);

        let (snapshots, metadata) = tokio::join!(
            self.backend.session_snapshots(&latest.id),
            self.backend.session_metadata(&latest.id),
        );
        let mut snapshots = match snapshots {
            Ok(snapshots) => snapshots,
            Err(e) => return Ok(fetch_error(WHAT, &e)),
        };
        let metadata = match metadata {
            Ok(metadata) => metadata,
            Err(e) => return Ok(fetch_error(WHAT, &e)),
        };

        if snapshots.is_empty() {
            return Ok(ToolCallResult::text(
                "No snapshots found for the most recent session.",
            ));
        }

        sort_chronologically(&mut snapshots);
        let (start, end) = span(&snapshots);
        let productive = productive_count(&snapshots);

        // A zero or missing backend figure falls back to counting snapshots
        let productivity = metadata
            .map(|m| m.productivity_percentage)
            .filter(|p| *p != 0.0)
            .unwrap_or_else(|| share(productive, snapshots.len()));

        titled(
            "Last Session Details",
            &LastSessionView {
                session_id: latest.id.clone(),
                start_time: iso_time(start),
                readable_start_time: readable_time(start),
                end_time: iso_time(end),
                readable_end_time: readable_time(end),
                snapshot_count: snapshots.len(),
                productivity_percentage: percent(productivity),
                productive_snapshots: productive,
                non_productive_snapshots: snapshots.len() - productive,
                snapshots: snapshots.iter().map(SnapshotView::new).collect(),
            },
        )
    }
}

// ════════════════════════════════════════════════════════════════════
// get_session_details
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionDetailsView {
    session_id: String,
    start_time: String,
    readable_start_time: String,
    end_time: String,
    readable_end_time: String,
    duration: String,
    duration_ms: Value,
    snapshot_count: usize,
    productivity_percentage: String,
    productive_snapshots: usize,
    non_productive_snapshots: usize,
    activities: Vec<String>,
    tabs: Vec<String>,
    snapshots: Vec<SnapshotView>,
}

/// Distinct non-empty tabs in first-seen order
fn unique_tabs(snapshots: &[Snapshot]) -> Vec<String> {
    let mut tabs: Vec<String> = Vec::new();
    for tab in snapshots.iter().filter_map(|s| s.current_tab.as_deref()) {
        if !tab.is_empty() && !tabs.iter().any(|t| t == tab) {
            tabs.push(tab.to_string());
        }
    }
    tabs
}

pub struct GetSessionDetails {
    backend: Arc<dyn Backend>,
}

impl GetSessionDetails {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetSessionDetails {
    type Args = SessionParams;

    fn name(&self) -> &'static str {
        "get_session_details"
    }

    fn description(&self) -> &'static str {
        "Get detailed information about a specific DillyDally session, including all snapshots, activity breakdown, productivity metrics, and session duration."
    }

    fn input_schema(&self) -> Value {
        session_schema("The session ID to get details for")
    }

    async fn call(&self, args: SessionParams) -> Result<ToolCallResult, ToolError> {
        const WHAT: &str = "session details";
        let id = args.session_id;

        let (snapshots, metadata, activities) = tokio::join!(
            self.backend.session_snapshots(&id),
            self.backend.session_metadata(&id),
            self.backend.session_activities(&id),
        );
        let (mut snapshots, metadata, activities) = match (snapshots, metadata, activities) {
            (Ok(s), Ok(m), Ok(a)) => (s, m, a),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return Ok(fetch_error(WHAT, &e)),
        };

        if snapshots.is_empty() {
            return Ok(ToolCallResult::text(format!(
                "Session with ID {} not found or has no snapshots.",
                id
            )));
        }

        sort_chronologically(&mut snapshots);
        let (start, end) = span(&snapshots);
        let productive = productive_count(&snapshots);

        let productivity = match metadata.map(|m| m.productivity_percentage) {
            Some(p) if p != 0.0 => percent(p),
            _ => percent((productive as f64 / snapshots.len() as f64 * 100.0).round()),
        };

        titled(
            "Session Details",
            &SessionDetailsView {
                session_id: id,
                start_time: iso_time(start),
                readable_start_time: readable_time(start),
                end_time: iso_time(end),
                readable_end_time: readable_time(end),
                duration: duration(end - start),
                duration_ms: number(end - start),
                snapshot_count: snapshots.len(),
                productivity_percentage: productivity,
                productive_snapshots: productive,
                non_productive_snapshots: snapshots.len() - productive,
                activities,
                tabs: unique_tabs(&snapshots),
                snapshots: snapshots.iter().map(SnapshotView::new).collect(),
            },
        )
    }
}

// ════════════════════════════════════════════════════════════════════
// get_session_metadata
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataView {
    session_id: String,
    duration: String,
    duration_ms: Value,
    snapshot_count: Value,
    activity_count: Value,
    productivity_percentage: String,
}

pub struct GetSessionMetadata {
    backend: Arc<dyn Backend>,
}

impl GetSessionMetadata {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetSessionMetadata {
    type Args = SessionParams;

    fn name(&self) -> &'static str {
        "get_session_metadata"
    }

    fn description(&self) -> &'static str {
        "Get metadata for a specific session including duration, snapshot count, activity count, and productivity percentage. This is a lightweight query that doesn't fetch full snapshot data."
    }

    fn input_schema(&self) -> Value {
        session_schema("The session ID to get metadata for")
    }

    async fn call(&self, args: SessionParams) -> Result<ToolCallResult, ToolError> {
        let id = args.session_id;

        let metadata = match self.backend.session_metadata(&id).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                return Ok(ToolCallResult::text(format!(
                    "No metadata found for session {}.",
                    id
                )))
            }
            Err(e) => return Ok(fetch_error("session metadata", &e)),
        };

        titled(
            "Session Metadata",
            &MetadataView {
                session_id: id,
                duration: duration(metadata.duration),
                duration_ms: number(metadata.duration),
                snapshot_count: number(metadata.snapshot_count),
                activity_count: number(metadata.activity_count),
                productivity_percentage: format!("{:.1}%", metadata.productivity_percentage),
            },
        )
    }
}

// ════════════════════════════════════════════════════════════════════
// get_session_snapshots
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotsView {
    session_id: String,
    snapshot_count: usize,
    snapshots: Vec<SnapshotView>,
}

pub struct GetSessionSnapshots {
    backend: Arc<dyn Backend>,
}

impl GetSessionSnapshots {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetSessionSnapshots {
    type Args = SessionParams;

    fn name(&self) -> &'static str {
        "get_session_snapshots"
    }

    fn description(&self) -> &'static str {
        "Get all activity snapshots for a specific session. Returns screenshots with activity analysis, productivity status, summaries, and timestamps."
    }

    fn input_schema(&self) -> Value {
        session_schema("The session ID to get snapshots for")
    }

    async fn call(&self, args: SessionParams) -> Result<ToolCallResult, ToolError> {
        let id = args.session_id;

        let snapshots = match self.backend.session_snapshots(&id).await {
            Ok(snapshots) => snapshots,
            Err(e) => return Ok(fetch_error("session snapshots", &e)),
        };

        if snapshots.is_empty() {
            return Ok(ToolCallResult::text(format!(
                "No snapshots found for session {}.",
                id
            )));
        }

        titled(
            "Session Snapshots",
            &SnapshotsView {
                session_id: id,
                snapshot_count: snapshots.len(),
                snapshots: snapshots
                    .iter()
                    .map(|s| SnapshotView::new(s).with_image_flag(s))
                    .collect(),
            },
        )
    }
}

// ════════════════════════════════════════════════════════════════════
// get_session_activities
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivitiesView {
    session_id: String,
    activity_count: usize,
    activities: Vec<String>,
}

pub struct GetSessionActivities {
    backend: Arc<dyn Backend>,
}

impl GetSessionActivities {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetSessionActivities {
    type Args = SessionParams;

    fn name(&self) -> &'static str {
        "get_session_activities"
    }

    fn description(&self) -> &'static str {
        "Get unique activity names for a specific session. Returns a list of all distinct activities that occurred during the session."
    }

    fn input_schema(&self) -> Value {
        session_schema("The session ID to get activities for")
    }

    async fn call(&self, args: SessionParams) -> Result<ToolCallResult, ToolError> {
        let id = args.session_id;

        let activities = match self.backend.session_activities(&id).await {
            Ok(activities) => activities,
            Err(e) => return Ok(fetch_error("session activities", &e)),
        };

        if activities.is_empty() {
            return Ok(ToolCallResult::text(format!(
                "No activities found for session {}.",
                id
            )));
        }

        titled(
            "Session Activities",
            &ActivitiesView {
                session_id: id,
                activity_count: activities.len(),
                activities,
            },
        )
    }
}
