//! Activity tools (get_recent_activity, get_productivity_stats,
//! get_weekly_insights)

use super::format::{elapsed, fetch_error, number, percent, share, titled, SnapshotView};
use super::user::NoParams;
use crate::protocol::ToolCallResult;
use crate::registry::{Tool, ToolError};
use async_trait::async_trait;
use chrono::Utc;
use dedalus_client::Backend;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_RECENT_LIMIT: usize = 10;
const DEFAULT_TIME_RANGE_HOURS: f64 = 24.0;

// ════════════════════════════════════════════════════════════════════
// get_recent_activity
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct RecentActivityParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub struct GetRecentActivity {
    backend: Arc<dyn Backend>,
}

impl GetRecentActivity {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetRecentActivity {
    type Args = RecentActivityParams;

    fn name(&self) -> &'static str {
        "get_recent_activity"
    }

    fn description(&self) -> &'static str {
        "Get recent activity snapshots from DillyDally. Returns the most recent activity snapshots with details like activity type, productivity status, and timestamps."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "number",
                    "description": "Number of recent activities to return (default: 10)"
                }
            },
            "required": []
        })
    }

    async fn call(&self, args: RecentActivityParams) -> Result<ToolCallResult, ToolError> {
        const WHAT: &str = "recent activity";
        let limit = args.limit.unwrap_or(DEFAULT_RECENT_LIMIT);

        let sessions = match self.backend.all_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => return Ok(fetch_error(WHAT, &e)),
        };
        let Some(latest) = sessions.first() else {
            return Ok(ToolCallResult::text("No recent activity found."));
        };

        let mut snapshots = match self.backend.session_snapshots(&latest.id).await {
            Ok(snapshots) => snapshots,
            Err(e) => return Ok(fetch_error(WHAT, &e)),
        };
        if snapshots.is_empty() {
            return Ok(ToolCallResult::text("No recent activity found."));
        }

        // Newest first
        snapshots.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));
        let views: Vec<SnapshotView> = snapshots
            .iter()
            .take(limit)
            .map(|s| SnapshotView::new(s).with_session_id(s))
            .collect();

        titled(&format!("Found {} recent activities", views.len()), &views)
    }
}

// ════════════════════════════════════════════════════════════════════
// get_productivity_stats
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityStatsParams {
    #[serde(default)]
    pub time_range_hours: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductivityStatsView {
    time_range_hours: Value,
    productivity_percentage: String,
    total_snapshots: usize,
    productive_snapshots: usize,
    non_productive_snapshots: usize,
    summary: String,
}

pub struct GetProductivityStats {
    backend: Arc<dyn Backend>,
}

impl GetProductivityStats {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetProductivityStats {
    type Args = ProductivityStatsParams;

    fn name(&self) -> &'static str {
        "get_productivity_stats"
    }

    fn description(&self) -> &'static str {
        "Get productivity statistics over a specified time range. Returns productivity percentage, total snapshots, and breakdown of productive vs non-productive activities."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timeRangeHours": {
                    "type": "number",
                    "description": "Number of hours to look back for statistics (default: 24)"
                }
            },
            "required": []
        })
    }

    async fn call(&self, args: ProductivityStatsParams) -> Result<ToolCallResult, ToolError> {
        const WHAT: &str = "productivity stats";
        let hours = args.time_range_hours.unwrap_or(DEFAULT_TIME_RANGE_HOURS);

        let sessions = match self.backend.all_sessions().await {
            Ok(sessions) => sessions,
            Err(e) => return Ok(fetch_error(WHAT, &e)),
        };
        if sessions.is_empty() {
            return Ok(ToolCallResult::text("No productivity statistics available."));
        }

        let cutoff = Utc::now().timestamp_millis() as f64 - hours * 3_600_000.0;
        debug!(
            "📊 Collecting snapshots from {} sessions newer than {}",
            sessions.len(),
            cutoff
        );

        let mut total = 0usize;
        let mut productive = 0usize;
        for session in &sessions {
            let snapshots = match self.backend.session_snapshots(&session.id).await {
                Ok(snapshots) => snapshots,
                Err(e) => return Ok(fetch_error(WHAT, &e)),
            };
            for snapshot in snapshots.iter().filter(|s| s.timestamp >= cutoff) {
                total += 1;
                if snapshot.is_productive {
                    productive += 1;
                }
            }
        }

        if total == 0 {
            return Ok(ToolCallResult::text(
                "No productivity statistics available for the specified time range.",
            ));
        }

        let percentage = share(productive, total);
        titled(
            "Productivity Statistics",
            &ProductivityStatsView {
                time_range_hours: number(hours),
                productivity_percentage: percent(percentage),
                total_snapshots: total,
                productive_snapshots: productive,
                non_productive_snapshots: total - productive,
                summary: format!(
                    "Over the last {} hours, {}% of activities were productive ({} out of {} snapshots).",
                    hours, percentage, productive, total
                ),
            },
        )
    }
}

// ════════════════════════════════════════════════════════════════════
// get_weekly_insights
// ════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThisWeekView {
    total_focus_time: String,
    total_focus_time_ms: Value,
    sessions_completed: Value,
    average_session_length: String,
    average_session_length_ms: Value,
    current_streak: String,
    weekly_goal_progress: String,
    distraction_alerts: Value,
    ai_assistance_time: String,
    ai_assistance_time_ms: Value,
    #[serde(rename = "focusWithoutAI")]
    focus_without_ai: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendsView {
    total_focus_time_trend: Value,
    sessions_completed_trend: Value,
    average_session_length_trend: Value,
    distraction_alerts_trend: Value,
    ai_assistance_time_trend: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeeklyInsightsView {
    this_week: ThisWeekView,
    trends: TrendsView,
    summary: String,
}

/// Trend as prose: strings verbatim, anything else as JSON
fn trend_text(trend: &Value) -> String {
    match trend {
        Value::String(s) => s.clone(),
        Value::Null => "unknown".to_string(),
        other => other.to_string(),
    }
}

pub struct GetWeeklyInsights {
    backend: Arc<dyn Backend>,
}

impl GetWeeklyInsights {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for GetWeeklyInsights {
    type Args = NoParams;

    fn name(&self) -> &'static str {
        "get_weekly_insights"
    }

    fn description(&self) -> &'static str {
        "Get comprehensive weekly productivity insights including focus time, sessions completed, average session length, current streak, weekly goal progress, distraction alerts, AI assistance time, and trends compared to last week."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn call(&self, _args: NoParams) -> Result<ToolCallResult, ToolError> {
        let insights = match self.backend.weekly_insights().await {
            Ok(Some(insights)) => insights,
            Ok(None) => {
                return Ok(ToolCallResult::text(
                    "No weekly insights available. User may not be authenticated.",
                ))
            }
            Err(e) => return Ok(fetch_error("weekly insights", &e)),
        };

        let summary = format!(
            "This week: {} sessions completed, {} focus time, {} day streak. Trends: {} focus time, {} sessions.",
            number(insights.sessions_completed),
            elapsed(insights.total_focus_time),
            number(insights.current_streak),
            trend_text(&insights.total_focus_time_trend),
            trend_text(&insights.sessions_completed_trend),
        );

        let view = WeeklyInsightsView {
            this_week: ThisWeekView {
                total_focus_time: elapsed(insights.total_focus_time),
                total_focus_time_ms: number(insights.total_focus_time),
                sessions_completed: number(insights.sessions_completed),
                average_session_length: elapsed(insights.average_session_length),
                average_session_length_ms: number(insights.average_session_length),
                current_streak: format!("{} days", number(insights.current_streak)),
                weekly_goal_progress: format!("{:.1}%", insights.weekly_goal_progress),
                distraction_alerts: number(insights.distraction_alerts),
                ai_assistance_time: elapsed(insights.ai_assistance_time),
                ai_assistance_time_ms: number(insights.ai_assistance_time),
                focus_without_ai: format!("{:.1}%", insights.focus_without_ai),
            },
            trends: TrendsView {
                total_focus_time_trend: insights.total_focus_time_trend,
                sessions_completed_trend: insights.sessions_completed_trend,
                average_session_length_trend: insights.average_session_length_trend,
                distraction_alerts_trend: insights.distraction_alerts_trend,
                ai_assistance_time_trend: insights.ai_assistance_time_trend,
            },
            summary,
        };

        titled("Weekly Insights", &view)
    }
}
