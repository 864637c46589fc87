//! Backend document types
//!
//! Timestamps are milliseconds since the Unix epoch. Convex encodes every
//! number as a float64, so counters are kept as `f64` here and rounded by the
//! consumers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated DillyDally user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: f64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One recorded focus session, as listed by `getAllSessions`
///
/// The backend returns sessions newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_creationTime")]
    pub creation_time: f64,
    /// Session length in milliseconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub activity_count: f64,
    #[serde(default)]
    pub snapshot_count: f64,
    #[serde(default)]
    pub productivity_percentage: f64,
}

/// A periodic activity snapshot captured during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(rename = "_id")]
    pub id: String,
    pub timestamp: f64,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub is_productive: bool,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub current_tab: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Screenshot attached to the snapshot, base64-encoded
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// Aggregated per-session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub snapshot_count: f64,
    #[serde(default)]
    pub activity_count: f64,
    #[serde(default)]
    pub productivity_percentage: f64,
}

/// A face-tracking sample from the camera
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSnapshot {
    #[serde(rename = "_id")]
    pub id: String,
    pub timestamp: f64,
    /// e.g. `looking_at_screen`, `away`, `no_face`
    #[serde(default)]
    pub attention_state: Option<String>,
}

/// Camera-based focus statistics for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionMetrics {
    pub session_id: String,
    #[serde(default)]
    pub total_snapshots: f64,
    #[serde(default)]
    pub focus_percentage: f64,
    #[serde(default)]
    pub looking_at_screen_count: f64,
    #[serde(default)]
    pub away_count: f64,
    #[serde(default)]
    pub no_face_count: f64,
    /// Per-state breakdown, passed through as the backend sends it
    #[serde(default)]
    pub attention_states: Value,
}

/// This week's totals plus trends against the previous week
///
/// Durations are milliseconds. Trends are passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyInsights {
    #[serde(default)]
    pub total_focus_time: f64,
    #[serde(default)]
    pub sessions_completed: f64,
    #[serde(default)]
    pub average_session_length: f64,
    #[serde(default)]
    pub current_streak: f64,
    #[serde(default)]
    pub weekly_goal_progress: f64,
    #[serde(default)]
    pub distraction_alerts: f64,
    #[serde(default)]
    pub ai_assistance_time: f64,
    #[serde(default, rename = "focusWithoutAI")]
    pub focus_without_ai: f64,
    #[serde(default)]
    pub total_focus_time_trend: Value,
    #[serde(default)]
    pub sessions_completed_trend: Value,
    #[serde(default)]
    pub average_session_length_trend: Value,
    #[serde(default)]
    pub distraction_alerts_trend: Value,
    #[serde(default)]
    pub ai_assistance_time_trend: Value,
}
