//! HTTP transport
//!
//! # Routes
//!
//! - `/mcp`: JSON-RPC over HTTP. A `POST` without `mcp-session-id` must carry
//!   `initialize` and opens a session; the id comes back in the response
//!   header. Later requests present the header. `DELETE` ends the session.
//! - `/health`: `200 OK` with `{ "status": "healthy", "timestamp": "..." }`
//! - anything else: `404 Not Found`

use crate::error::{codes, McpResult};
use crate::protocol::{methods, IncomingMessage, JsonRpcError, JsonRpcReply, OutgoingMessage};
use crate::registry::ToolRegistry;
use crate::server::McpServer;
use crate::transport::session::{Session, SessionStore};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Header carrying the session id in both directions
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Shared state behind every HTTP handler
#[derive(Clone)]
pub struct HttpState {
    registry: Arc<ToolRegistry>,
    sessions: SessionStore,
}

impl HttpState {
    pub fn new(registry: Arc<ToolRegistry>, sessions: SessionStore) -> Self {
        Self { registry, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Build the axum application
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/mcp", any(mcp_handler))
        .route("/health", any(health_handler))
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Serve on `listener` until `shutdown` resolves
///
/// With `idle_timeout` set, a background task reclaims idle sessions. Every
/// remaining session is closed before this returns.
pub async fn serve<F>(
    listener: TcpListener,
    state: HttpState,
    idle_timeout: Option<Duration>,
    shutdown: F,
) -> McpResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("🌐 HTTP transport listening on http://{}/mcp", addr);
    }

    let reaper = idle_timeout.map(|timeout| spawn_reaper(state.sessions.clone(), timeout));

    let result = axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown)
        .await;

    if let Some(reaper) = reaper {
        reaper.abort();
    }
    state.sessions.close_all().await;
    info!("👋 HTTP transport stopped");

    result?;
    Ok(())
}

fn spawn_reaper(sessions: SessionStore, timeout: Duration) -> JoinHandle<()> {
    let period = (timeout / 2).clamp(Duration::from_secs(1), Duration::from_secs(60));
    debug!("⏱️  Reaping sessions idle for {:?}, checking every {:?}", timeout, period);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            sessions.reap_idle(timeout);
        }
    })
}

async fn mcp_handler(
    State(state): State<HttpState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let session_id = headers
        .get(SESSION_HEADER)
        .map(|value| value.to_str().unwrap_or_default().to_string());

    match session_id {
        Some(id) => {
            let Some(session) = state.sessions.get(&id) else {
                debug!("❓ Unknown session {}", id);
                return (StatusCode::NOT_FOUND, "Session not found").into_response();
            };

            match method {
                Method::POST => forward(&session, &body).await,
                Method::DELETE => {
                    state.sessions.remove(&id).await;
                    StatusCode::OK.into_response()
                }
                _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
            }
        }
        None if method == Method::POST => open_session(&state, &body).await,
        None => (StatusCode::BAD_REQUEST, "Invalid request").into_response(),
    }
}

async fn forward(session: &Session, body: &[u8]) -> Response {
    let message = match parse_body(body) {
        Ok(message) => message,
        Err(reply) => return (StatusCode::BAD_REQUEST, Json(reply)).into_response(),
    };

    let _request = session.begin_request();
    let reply = session.server().lock().await.handle_message(message).await;
    outgoing(reply)
}

async fn open_session(state: &HttpState, body: &[u8]) -> Response {
    let message = match parse_body(body) {
        Ok(message) => message,
        Err(reply) => return (StatusCode::BAD_REQUEST, Json(reply)).into_response(),
    };

    if message.first_method() != Some(methods::INITIALIZE) {
        warn!("⚠️  Rejected session-less request that is not initialize");
        return (StatusCode::BAD_REQUEST, Json(no_session_error())).into_response();
    }

    let mut server = McpServer::new(Arc::clone(&state.registry));
    let reply = server.handle_message(message).await;

    if !server.is_handshake_complete() {
        let body = reply.unwrap_or_else(|| OutgoingMessage::Single(no_session_error()));
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let session = state.sessions.insert(server);
    let header = [(SESSION_HEADER, session.id().to_string())];
    match reply {
        Some(reply) => (header, Json(reply)).into_response(),
        None => (StatusCode::ACCEPTED, header).into_response(),
    }
}

fn parse_body(body: &[u8]) -> Result<IncomingMessage, OutgoingMessage> {
    IncomingMessage::parse_slice(body).map_err(OutgoingMessage::Single)
}

fn outgoing(reply: Option<OutgoingMessage>) -> Response {
    match reply {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn no_session_error() -> JsonRpcReply {
    JsonRpcReply::error(
        Value::Null,
        JsonRpcError::new(
            codes::CONNECTION_CLOSED,
            "Bad Request: No valid session ID provided".to_string(),
            None,
        ),
    )
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_session_error_shape() {
        let value = serde_json::to_value(no_session_error()).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32000);
        assert_eq!(
            value["error"]["message"],
            "Bad Request: No valid session ID provided"
        );
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        let reply = parse_body(b"{oops").unwrap_err();
        assert!(reply.replies()[0].is_error());
        assert!(parse_body(b"\xff\xfe").is_err());
        assert!(parse_body(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).is_ok());
    }
}
