//! Rendering helpers shared by the backend tools

use crate::protocol::ToolCallResult;
use crate::registry::ToolError;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use dedalus_client::{ClientError, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};

/// Largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn datetime(ms: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

/// `2024-01-15T10:30:00.000Z`
pub fn iso_time(ms: f64) -> String {
    datetime(ms).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Local wall-clock form, e.g. `1/15/2024, 10:30:00 AM`
pub fn readable_time(ms: f64) -> String {
    datetime(ms)
        .with_timezone(&Local)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}

/// `"<h>h <m>m"` from milliseconds, rounded to the nearest minute
pub fn duration(ms: f64) -> String {
    let minutes = (ms / 60_000.0).round() as i64;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// `"<h>h <m>m"` from milliseconds, partial minutes dropped
pub fn elapsed(ms: f64) -> String {
    let minutes = (ms / 60_000.0).floor() as i64;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// JSON number, integral values without a fractional part
pub fn number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        json!(value as i64)
    } else {
        json!(value)
    }
}

pub fn percent(value: f64) -> String {
    format!("{}%", value)
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of `part` in `total` as a percentage, rounded to two decimals
pub fn share(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// `"<heading>:\n\n<pretty JSON>"`
pub fn titled<T: Serialize>(heading: &str, body: &T) -> Result<ToolCallResult, ToolError> {
    let json = serde_json::to_string_pretty(body).map_err(|e| ToolError::Internal(e.to_string()))?;
    Ok(ToolCallResult::text(format!("{}:\n\n{}", heading, json)))
}

/// `Error fetching <what>: <reason>`
pub fn fetch_error(what: &str, err: &ClientError) -> ToolCallResult {
    tracing::warn!("⚠️  Error fetching {}: {}", what, err);
    ToolCallResult::error(format!("Error fetching {}: {}", what, err))
}

/// One snapshot as shown to the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView {
    pub id: String,
    pub timestamp: String,
    pub readable_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    pub is_productive: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_tab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_image: Option<bool>,
}

impl SnapshotView {
    pub fn new(snapshot: &Snapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            timestamp: iso_time(snapshot.timestamp),
            readable_time: readable_time(snapshot.timestamp),
            activity: snapshot.activity.clone(),
            is_productive: yes_no(snapshot.is_productive),
            summary: snapshot.summary.clone(),
            current_tab: snapshot.current_tab.clone(),
            session_id: None,
            has_image: None,
        }
    }

    pub fn with_session_id(mut self, snapshot: &Snapshot) -> Self {
        self.session_id = snapshot.session_id.clone();
        self
    }

    pub fn with_image_flag(mut self, snapshot: &Snapshot) -> Self {
        self.has_image = Some(
            snapshot
                .image_base64
                .as_deref()
                .is_some_and(|data| !data.is_empty()),
        );
        self
    }
}

/// Sort oldest first
pub fn sort_chronologically(snapshots: &mut [Snapshot]) {
    snapshots.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
}
