//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dedalus_client::{
    AttentionMetrics, Backend, CameraSnapshot, ClientError, ClientResult, SessionMetadata,
    SessionSummary, Snapshot, User, WeeklyInsights,
};
use dedalus_mcp::protocol::ToolCallResult;
use dedalus_mcp::{Tool, ToolError, ToolRegistry};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory backend
#[derive(Debug, Default)]
pub struct FakeBackend {
    pub user: Option<User>,
    /// Newest first, like the real backend
    pub sessions: Vec<SessionSummary>,
    pub snapshots: HashMap<String, Vec<Snapshot>>,
    pub metadata: HashMap<String, SessionMetadata>,
    pub activities: HashMap<String, Vec<String>>,
    pub camera: HashMap<String, Vec<CameraSnapshot>>,
    /// Keyed by session id; a query without one reads the newest session
    pub attention: HashMap<String, AttentionMetrics>,
    pub weekly: Option<WeeklyInsights>,
    /// When set, every query fails with this message
    pub failure: Option<String>,
}

impl FakeBackend {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn check(&self, function: &str) -> ClientResult<()> {
        match &self.failure {
            Some(message) => Err(ClientError::query_failed(function, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn current_user(&self) -> ClientResult<Option<User>> {
        self.check("currentUser")?;
        Ok(self.user.clone())
    }

    async fn all_sessions(&self) -> ClientResult<Vec<SessionSummary>> {
        self.check("getAllSessions")?;
        Ok(self.sessions.clone())
    }

    async fn session_snapshots(&self, session_id: &str) -> ClientResult<Vec<Snapshot>> {
        self.check("getSessionSnapshots")?;
        Ok(self.snapshots.get(session_id).cloned().unwrap_or_default())
    }

    async fn session_metadata(&self, session_id: &str) -> ClientResult<Option<SessionMetadata>> {
        self.check("getSessionMetadata")?;
        Ok(self.metadata.get(session_id).cloned())
    }

    async fn session_activities(&self, session_id: &str) -> ClientResult<Vec<String>> {
        self.check("getSessionActivities")?;
        Ok(self.activities.get(session_id).cloned().unwrap_or_default())
    }

    async fn session_camera_snapshots(&self, session_id: &str) -> ClientResult<Vec<CameraSnapshot>> {
        self.check("getSessionCameraSnapshots")?;
        Ok(self.camera.get(session_id).cloned().unwrap_or_default())
    }

    async fn attention_metrics(
        &self,
        session_id: Option<&str>,
    ) -> ClientResult<Option<AttentionMetrics>> {
        self.check("getAttentionMetrics")?;
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => match self.sessions.first() {
                Some(latest) => latest.id.clone(),
                None => return Ok(None),
            },
        };
        Ok(self.attention.get(&session_id).cloned())
    }

    async fn weekly_insights(&self) -> ClientResult<Option<WeeklyInsights>> {
        self.check("getWeeklyInsights")?;
        Ok(self.weekly.clone())
    }
}

pub fn session(id: &str, creation_time: f64, duration: f64, productivity: f64) -> SessionSummary {
    serde_json::from_value(json!({
        "_id": id,
        "_creationTime": creation_time,
        "duration": duration,
        "activityCount": 3,
        "snapshotCount": 4,
        "productivityPercentage": productivity
    }))
    .unwrap()
}

pub fn snapshot(
    id: &str,
    session_id: &str,
    timestamp: f64,
    productive: bool,
    tab: Option<&str>,
) -> Snapshot {
    serde_json::from_value(json!({
        "_id": id,
        "timestamp": timestamp,
        "activity": format!("activity-{}", id),
        "isProductive": productive,
        "summary": format!("summary of {}", id),
        "currentTab": tab,
        "sessionId": session_id
    }))
    .unwrap()
}

pub fn metadata(duration: f64, productivity: f64) -> SessionMetadata {
    serde_json::from_value(json!({
        "duration": duration,
        "snapshotCount": 4,
        "activityCount": 2,
        "productivityPercentage": productivity
    }))
    .unwrap()
}

pub fn camera(id: &str, timestamp: f64, state: &str) -> CameraSnapshot {
    serde_json::from_value(json!({
        "_id": id,
        "timestamp": timestamp,
        "attentionState": state
    }))
    .unwrap()
}

pub fn attention(session_id: &str, total: f64, focus: f64) -> AttentionMetrics {
    serde_json::from_value(json!({
        "sessionId": session_id,
        "totalSnapshots": total,
        "focusPercentage": focus,
        "lookingAtScreenCount": 3,
        "awayCount": 1,
        "noFaceCount": 0,
        "attentionStates": { "looking_at_screen": 3, "away": 1 }
    }))
    .unwrap()
}

/// Session `s1` (newest) with four snapshots and `s0` with none
pub fn populated() -> FakeBackend {
    let base = 1_705_314_600_000.0;
    let mut backend = FakeBackend {
        user: serde_json::from_value(json!({
            "_id": "user1",
            "_creationTime": base,
            "email": "ada@example.com",
            "name": "Ada"
        }))
        .unwrap(),
        sessions: vec![
            session("s1", base, 5_400_000.0, 75.0),
            session("s0", base - 86_400_000.0, 600_000.0, 0.0),
        ],
        ..FakeBackend::default()
    };

    backend.snapshots.insert(
        "s1".to_string(),
        vec![
            snapshot("c", "s1", base + 120_000.0, false, Some("mail")),
            snapshot("a", "s1", base, true, Some("docs")),
            snapshot("d", "s1", base + 5_400_000.0, true, Some("docs")),
            snapshot("b", "s1", base + 60_000.0, true, None),
        ],
    );
    backend
        .metadata
        .insert("s1".to_string(), metadata(5_400_000.0, 75.0));
    backend.activities.insert(
        "s1".to_string(),
        vec!["coding".to_string(), "email".to_string()],
    );
    backend.camera.insert(
        "s1".to_string(),
        vec![
            camera("k1", base, "looking_at_screen"),
            camera("k2", base + 60_000.0, "away"),
            camera("k3", base + 120_000.0, "looking_at_screen"),
        ],
    );
    backend
        .attention
        .insert("s1".to_string(), attention("s1", 4.0, 75.0));
    backend
        .attention
        .insert("s0".to_string(), attention("s0", 0.0, 0.0));
    backend.weekly = Some(
        serde_json::from_value(json!({
            "totalFocusTime": 9_059_999,
            "sessionsCompleted": 5,
            "averageSessionLength": 1_812_000,
            "currentStreak": 3,
            "weeklyGoalProgress": 62.345,
            "distractionAlerts": 7,
            "aiAssistanceTime": 600_000,
            "focusWithoutAI": 80,
            "totalFocusTimeTrend": "up",
            "sessionsCompletedTrend": "down",
            "averageSessionLengthTrend": "stable",
            "distractionAlertsTrend": "down",
            "aiAssistanceTimeTrend": "up"
        }))
        .unwrap(),
    );
    backend
}

#[derive(Debug, Deserialize)]
pub struct SleepArgs {
    pub tag: String,
    pub ms: u64,
}

/// Sleeps for `ms`, logging `start <tag>` and `end <tag>`
#[derive(Clone, Default)]
pub struct Sleepy {
    pub log: Arc<Mutex<Vec<String>>>,
}

impl Sleepy {
    pub fn events(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.log.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Tool for Sleepy {
    type Args = SleepArgs;

    fn name(&self) -> &'static str {
        "sleep"
    }

    fn description(&self) -> &'static str {
        "Sleeps, then answers with its tag"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tag": { "type": "string" },
                "ms": { "type": "number" }
            },
            "required": ["tag", "ms"]
        })
    }

    async fn call(&self, args: SleepArgs) -> Result<ToolCallResult, ToolError> {
        self.record(format!("start {}", args.tag));
        tokio::time::sleep(Duration::from_millis(args.ms)).await;
        self.record(format!("end {}", args.tag));
        Ok(ToolCallResult::text(args.tag))
    }
}

/// Registry holding only the `sleep` tool
pub fn sleepy_registry(sleepy: &Sleepy) -> ToolRegistry {
    ToolRegistry::builder()
        .register(sleepy.clone())
        .build()
        .unwrap()
}
