//! HTTP client for the DillyDally backend
//!
//! Async client that calls Convex query functions over HTTP.

use crate::backend::Backend;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{functions, QueryRequest, QueryResponse};
use crate::records::{
    AttentionMetrics, CameraSnapshot, SessionMetadata, SessionSummary, Snapshot, User,
    WeeklyInsights,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Timeout for establishing the TCP/TLS connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a whole query round-trip
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Convex query client
#[derive(Debug, Clone)]
pub struct ConvexClient {
    base_url: String,
    auth_token: Option<String>,
    http: reqwest::Client,
}

impl ConvexClient {
    /// Create a client for the deployment at `base_url`
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ClientError::connection_failed(
                    base_url.clone(),
                    format!("failed to build HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            base_url,
            auth_token: None,
            http,
        })
    }

    /// Attach a bearer token sent with every query
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Deployment URL (without trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a query function and return its raw JSON value
    pub async fn query(&self, function: &str, args: Value) -> ClientResult<Value> {
        let url = format!("{}/api/query", self.base_url);
        let body = QueryRequest::new(function, args);

        debug!("📡 Querying {} at {}", body.path, url);

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::connection_failed(url.clone(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                function: function.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::connection_failed(url, e.to_string()))?;
        let parsed: QueryResponse = serde_json::from_slice(&bytes)?;

        parsed
            .into_result()
            .map_err(|message| ClientError::query_failed(function, message))
    }

    /// Run a query and decode its value, mapping `null` to `T::default()`
    async fn query_as<T>(&self, function: &str, args: Value) -> ClientResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.query(function, args).await? {
            Value::Null => Ok(T::default()),
            value => Ok(serde_json::from_value(value)?),
        }
    }
}

#[async_trait]
impl Backend for ConvexClient {
    async fn current_user(&self) -> ClientResult<Option<User>> {
        self.query_as(functions::CURRENT_USER, json!({})).await
    }

    async fn all_sessions(&self) -> ClientResult<Vec<SessionSummary>> {
        self.query_as(functions::GET_ALL_SESSIONS, json!({})).await
    }

    async fn session_snapshots(&self, session_id: &str) -> ClientResult<Vec<Snapshot>> {
        self.query_as(
            functions::GET_SESSION_SNAPSHOTS,
            json!({ "sessionId": session_id }),
        )
        .await
    }

    async fn session_metadata(&self, session_id: &str) -> ClientResult<Option<SessionMetadata>> {
        self.query_as(
            functions::GET_SESSION_METADATA,
            json!({ "sessionId": session_id }),
        )
        .await
    }

    async fn session_activities(&self, session_id: &str) -> ClientResult<Vec<String>> {
        self.query_as(
            functions::GET_SESSION_ACTIVITIES,
            json!({ "sessionId": session_id }),
        )
        .await
    }

    async fn session_camera_snapshots(&self, session_id: &str) -> ClientResult<Vec<CameraSnapshot>> {
        self.query_as(
            functions::GET_SESSION_CAMERA_SNAPSHOTS,
            json!({ "sessionId": session_id }),
        )
        .await
    }

    async fn attention_metrics(
        &self,
        session_id: Option<&str>,
    ) -> ClientResult<Option<AttentionMetrics>> {
        let args = match session_id {
            Some(id) => json!({ "sessionId": id }),
            None => json!({}),
        };
        self.query_as(functions::GET_ATTENTION_METRICS, args).await
    }

    async fn weekly_insights(&self) -> ClientResult<Option<WeeklyInsights>> {
        self.query_as(functions::GET_WEEKLY_INSIGHTS, json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};

    /// Serve a fake `/api/query` endpoint and return its base URL
    async fn spawn_fake_backend() -> String {
        let app = Router::new().route(
            "/api/query",
            post(|Json(body): Json<Value>| async move {
                let path = body["path"].as_str().unwrap_or_default().to_string();
                let reply = match path.as_str() {
                    "functions:getAllSessions" => json!({
                        "status": "success",
                        "value": [{
                            "_id": "s1",
                            "_creationTime": 1_700_000_000_000.0,
                            "duration": 60_000,
                            "activityCount": 1,
                            "snapshotCount": 2,
                            "productivityPercentage": 50
                        }]
                    }),
                    "functions:currentUser" => json!({ "status": "success", "value": null }),
                    "functions:getSessionActivities" => json!({
                        "status": "success",
                        "value": [body["args"]["sessionId"].clone()]
                    }),
                    "functions:getAttentionMetrics" => json!({
                        "status": "success",
                        "value": {
                            "sessionId": body["args"]["sessionId"].as_str().unwrap_or("latest"),
                            "totalSnapshots": 4,
                            "focusPercentage": 75
                        }
                    }),
                    _ => json!({ "status": "error", "errorMessage": "unknown function" }),
                };
                Json(reply)
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ConvexClient::new("https://example.convex.cloud/").unwrap();
        assert_eq!(client.base_url(), "https://example.convex.cloud");
    }

    #[tokio::test]
    async fn test_all_sessions_decoded() {
        let client = ConvexClient::new(spawn_fake_backend().await).unwrap();
        let sessions = client.all_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "s1");
    }

    #[tokio::test]
    async fn test_null_value_maps_to_none() {
        let client = ConvexClient::new(spawn_fake_backend().await).unwrap();
        assert!(client.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attention_metrics_session_is_optional() {
        let client = ConvexClient::new(spawn_fake_backend().await).unwrap();

        let latest = client.attention_metrics(None).await.unwrap().unwrap();
        assert_eq!(latest.session_id, "latest");
        assert_eq!(latest.focus_percentage, 75.0);

        let chosen = client.attention_metrics(Some("s9")).await.unwrap().unwrap();
        assert_eq!(chosen.session_id, "s9");
    }

    #[tokio::test]
    async fn test_session_id_forwarded_as_argument() {
        let client = ConvexClient::new(spawn_fake_backend().await).unwrap();
        let activities = client.session_activities("abc").await.unwrap();
        assert_eq!(activities, vec!["abc".to_string()]);
    }

    #[tokio::test]
    async fn test_backend_error_message_surfaces() {
        let client = ConvexClient::new(spawn_fake_backend().await).unwrap();
        let err = client.session_metadata("abc").await.unwrap_err();
        assert!(matches!(err, ClientError::QueryFailed { .. }));
        assert!(err.to_string().contains("unknown function"));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = ConvexClient::new("http://127.0.0.1:1").unwrap();
        let err = client.all_sessions().await.unwrap_err();
        assert!(matches!(err, ClientError::ConnectionFailed { .. }));
    }
}
