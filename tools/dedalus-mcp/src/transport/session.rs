//! HTTP session store
//!
//! Maps `mcp-session-id` values to the [`McpServer`] serving that client.
//! Cloning a [`SessionStore`] is cheap; all clones share one map.

use crate::server::McpServer;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque session identifier (a UUIDv4 string)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One client session
///
/// Requests lock `server` for their whole duration, so a session processes
/// its requests one at a time in arrival order. A session with a request
/// queued or running is never idle.
pub struct Session {
    id: SessionId,
    server: Mutex<McpServer>,
    last_seen: StdMutex<Instant>,
    in_flight: AtomicUsize,
}

impl Session {
    fn new(id: SessionId, server: McpServer) -> Self {
        Self {
            id,
            server: Mutex::new(server),
            last_seen: StdMutex::new(Instant::now()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// The server owned by this session
    pub fn server(&self) -> &Mutex<McpServer> {
        &self.server
    }

    /// Record activity now
    pub fn touch(&self) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            *last_seen = Instant::now();
        }
    }

    /// Time since the last recorded activity
    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .map(|last_seen| last_seen.elapsed())
            .unwrap_or_default()
    }

    /// Mark a request as in flight until the returned guard drops
    pub fn begin_request(&self) -> RequestGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        RequestGuard { session: self }
    }

    /// Whether a request is queued or running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        !self.is_busy() && self.idle_for() > timeout
    }

    /// Close the owned server, waiting for any in-flight request
    pub async fn close(&self) {
        self.server.lock().await.close();
    }
}

/// Keeps a [`Session`] busy; touches it on drop
pub struct RequestGuard<'a> {
    session: &'a Session,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.session.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.session.touch();
    }
}

/// Close without waiting: immediately when the server is free, otherwise on
/// a background task once the current holder lets go
fn close_detached(session: Arc<Session>) {
    if let Ok(mut server) = session.server.try_lock() {
        server.close();
        return;
    }
    tokio::spawn(async move { session.close().await });
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Shared registry of live sessions
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<SessionId, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `server` under a freshly generated id
    pub fn insert(&self, server: McpServer) -> Arc<Session> {
        let id = SessionId::generate();
        let session = Arc::new(Session::new(id.clone(), server));
        self.sessions.insert(id.clone(), Arc::clone(&session));
        info!("🆕 Session {} registered ({} active)", id, self.len());
        session
    }

    /// Look a session up; touches it on a hit
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        let session = self
            .sessions
            .get(&SessionId::from(id))
            .map(|entry| Arc::clone(entry.value()))?;
        session.touch();
        Some(session)
    }

    /// Remove and close a session
    pub async fn remove(&self, id: &str) -> bool {
        match self.sessions.remove(&SessionId::from(id)) {
            Some((_, session)) => {
                session.close().await;
                info!("🗑️  Session {} closed ({} active)", id, self.len());
                true
            }
            None => false,
        }
    }

    /// Remove and close every session
    pub async fn close_all(&self) {
        let ids: Vec<SessionId> = self.sessions.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, session)) = self.sessions.remove(&id) {
                session.close().await;
            }
        }
        debug!("🧹 All sessions closed");
    }

    /// Remove and close sessions idle for longer than `timeout`
    ///
    /// Busy sessions are skipped. Never waits on a session's lock. Returns
    /// how many were reclaimed.
    pub fn reap_idle(&self, timeout: Duration) -> usize {
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|e| e.value().is_expired(timeout))
            .map(|e| e.key().clone())
            .collect();

        let mut reaped = 0;
        for id in expired {
            // A request may have arrived since the scan
            if let Some((_, session)) = self
                .sessions
                .remove_if(&id, |_, session| session.is_expired(timeout))
            {
                close_detached(session);
                info!("⌛ Session {} expired after {:?} idle", id, timeout);
                reaped += 1;
            }
        }
        reaped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
