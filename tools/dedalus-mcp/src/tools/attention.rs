//! Camera attention tools (get_attention_metrics, get_session_camera_snapshots)

use super::format::{fetch_error, iso_time, number, percent, readable_time, titled};
use super::sessions::{session_schema, SessionParams};
use crate::protocol::ToolCallResult;
use crate::registry::{Tool, ToolError};
use async_trait::async_trait;
use dedalus_client::Backend;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const LOOKING_AT_SCREEN: &str = "looking_at_screen";

// ════════════════════════════════════════════════════════════════════
// get_attention_metrics
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionParams {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttentionView {
    session_id: String,
    total_snapshots: Value,
    focus_percentage: String,
    looking_at_screen_count: Value,
    away_count: Value,
    no_face_count: Value,
    attention_states: Value,
    summary: String,
}

pub struct GetAttentionMetrics {
    backend: Arc<dyn Backend>,
}

impl GetAttentionMetrics {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetAttentionMetrics {
    type Args = AttentionParams;

    fn name(&self) -> &'static str {
        "get_attention_metrics"
    }

    fn description(&self) -> &'static str {
        "Get attention/focus metrics from camera snapshots for a specific session or the most recent session. Returns attention state breakdown, focus percentage, and time spent looking at screen."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sessionId": {
                    "type": "string",
                    "description": "Optional: Specific session ID. If not provided, uses the most recent session."
                }
            },
            "required": []
        })
    }

    async fn call(&self, args: AttentionParams) -> Result<ToolCallResult, ToolError> {
        let metrics = match self.backend.attention_metrics(args.session_id.as_deref()).await {
            Ok(Some(metrics)) => metrics,
            Ok(None) => {
                return Ok(ToolCallResult::text(
                    "No attention metrics available. No sessions found.",
                ))
            }
            Err(e) => return Ok(fetch_error("attention metrics", &e)),
        };

        if metrics.total_snapshots == 0.0 {
            return Ok(ToolCallResult::text(format!(
                "Session {} has no camera snapshots.",
                metrics.session_id
            )));
        }

        let focus = percent(metrics.focus_percentage);
        let view = AttentionView {
            summary: format!(
                "Out of {} camera snapshots, {} showed the user looking at the screen.",
                number(metrics.total_snapshots),
                focus
            ),
            session_id: metrics.session_id,
            total_snapshots: number(metrics.total_snapshots),
            focus_percentage: focus,
            looking_at_screen_count: number(metrics.looking_at_screen_count),
            away_count: number(metrics.away_count),
            no_face_count: number(metrics.no_face_count),
            attention_states: metrics.attention_states,
        };

        titled("Attention Metrics", &view)
    }
}

// ════════════════════════════════════════════════════════════════════
// get_session_camera_snapshots
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CameraSnapshotView {
    id: String,
    timestamp: String,
    readable_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attention_state: Option<String>,
    is_looking_at_screen: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CameraSnapshotsView {
    session_id: String,
    snapshot_count: usize,
    focus_percentage: String,
    looking_at_screen_count: usize,
    away_count: usize,
    snapshots: Vec<CameraSnapshotView>,
}

pub struct GetSessionCameraSnapshots {
    backend: Arc<dyn Backend>,
}

impl GetSessionCameraSnapshots {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetSessionCameraSnapshots {
    type Args = SessionParams;

    fn name(&self) -> &'static str {
        "get_session_camera_snapshots"
    }

    fn description(&self) -> &'static str {
        "Get all camera snapshots (face tracking attention states) for a specific session. Returns attention states with timestamps showing when the user was looking at the screen or distracted."
    }

    fn input_schema(&self) -> Value {
        session_schema("The session ID to get camera snapshots for")
    }

    async fn call(&self, args: SessionParams) -> Result<ToolCallResult, ToolError> {
        let session_id = args.session_id;
        let snapshots = match self.backend.session_camera_snapshots(&session_id).await {
            Ok(snapshots) => snapshots,
            Err(e) => return Ok(fetch_error("session camera snapshots", &e)),
        };

        if snapshots.is_empty() {
            return Ok(ToolCallResult::text(format!(
                "No camera snapshots found for session {}.",
                session_id
            )));
        }

        let views: Vec<CameraSnapshotView> = snapshots
            .into_iter()
            .map(|snapshot| CameraSnapshotView {
                id: snapshot.id,
                timestamp: iso_time(snapshot.timestamp),
                readable_time: readable_time(snapshot.timestamp),
                is_looking_at_screen: snapshot.attention_state.as_deref() == Some(LOOKING_AT_SCREEN),
                attention_state: snapshot.attention_state,
            })
            .collect();

        let looking = views.iter().filter(|v| v.is_looking_at_screen).count();
        let focus = (looking as f64 / views.len() as f64 * 100.0).round();

        titled(
            "Session Camera Snapshots",
            &CameraSnapshotsView {
                session_id,
                snapshot_count: views.len(),
                focus_percentage: percent(focus),
                looking_at_screen_count: looking,
                away_count: views.len() - looking,
                snapshots: views,
            },
        )
    }
}
