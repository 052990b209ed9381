//! Session Store
//!
//! Manages interactive sessions with:
//! - In-memory storage, one lock per session
//! - Idle expiry and a background cleanup task

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use super::types::Session;

type SessionHandle = Arc<Mutex<Session>>;

/// Holds every live session
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    /// Idle time after which a session is evicted
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                sessions: RwLock::new(HashMap::new()),
                ttl,
            }),
        }
    }

    /// Start a new session and return its ID
    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;

        let mut sessions = self.inner.sessions.write().await;
        sessions.insert(id, Arc::new(Mutex::new(session)));

        tracing::info!(session_id = %id, "Created session");
        id
    }

    /// Lock a session for the duration of one interaction.
    ///
    /// Actions on the same session queue behind each other; other sessions are
    /// unaffected.
    pub async fn lock(&self, id: Uuid) -> Option<OwnedMutexGuard<Session>> {
        let handle = {
            let sessions = self.inner.sessions.read().await;
            sessions.get(&id).cloned()?
        };

        let mut session = handle.lock_owned().await;
        session.touch();
        Some(session)
    }

    /// Lock a session by string ID
    pub async fn lock_by_str(&self, id: &str) -> Option<OwnedMutexGuard<Session>> {
        let uuid = Uuid::parse_str(id).ok()?;
        self.lock(uuid).await
    }

    /// End a session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session ended");
        }
        removed
    }

    /// Get session count
    pub async fn count(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Evict sessions idle for longer than the TTL.
    ///
    /// Sessions currently locked by an interaction are in use and kept.
    /// Returns the number of sessions removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.inner.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => !session.is_expired(self.inner.ttl, now),
            Err(_) => true,
        });

        let count = before - sessions.len();
        if count > 0 {
            tracing::info!(count = count, "Cleaned up expired sessions");
        }
        count
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self, interval: std::time::Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);

            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        })
    }
}
