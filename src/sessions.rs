//! Session store: in-memory map of live coaching sessions with idle expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::coaching::SessionState;
use crate::error::SessionError;

/// How often the sweep task looks for idle sessions.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// One visitor's session. Locked for the whole of an interaction.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub state: SessionState,
}

pub type SessionHandle = Arc<Mutex<Session>>;

struct Entry {
    session: SessionHandle,
    created_at: DateTime<Utc>,
    last_active: Instant,
}

impl Entry {
    fn age_secs(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }
}

/// Live sessions keyed by id. Sessions only share this map.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    /// Start a fresh session at the first step.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session {
            id,
            state: SessionState::default(),
        }));

        self.sessions.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                created_at: Utc::now(),
                last_active: Instant::now(),
            },
        );
        info!(session_id = %id, "Session created");
        (id, session)
    }

    /// Look up a session and mark it active. An idle session is dropped on access.
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound { id })?;

        let idle = entry.last_active.elapsed();
        if idle >= self.idle_timeout {
            debug!(
                session_id = %id,
                idle_secs = idle.as_secs(),
                age_secs = entry.age_secs(),
                "Session expired on access"
            );
            sessions.remove(&id);
            return Err(SessionError::Expired { id, idle });
        }

        entry.last_active = Instant::now();
        Ok(entry.session.clone())
    }

    /// End a session. Returns false if it didn't exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        match self.sessions.write().await.remove(&id) {
            Some(entry) => {
                info!(session_id = %id, age_secs = entry.age_secs(), "Session ended");
                true
            }
            None => false,
        }
    }

    /// Drop sessions idle for at least the timeout. Returns how many were dropped.
    pub async fn expire_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active.elapsed() < self.idle_timeout);
        let expired = before - sessions.len();

        if expired > 0 {
            info!(count = expired, remaining = sessions.len(), "Expired idle sessions");
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Spawn a background task that periodically drops idle sessions.
pub fn spawn_expiry_task(store: Arc<SessionStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            store.expire_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coaching::Step;

    #[tokio::test]
    async fn create_and_get() {
        let store = SessionStore::new(Duration::from_secs(3600));
        assert!(store.is_empty().await);

        let (id, _) = store.create().await;
        assert_eq!(store.len().await, 1);

        let handle = store.get(id).await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.id, id);
        assert_eq!(session.state.step, Step::LeadCapture);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (a, _) = store.create().await;
        let (b, _) = store.create().await;
        assert_ne!(a, b);

        store.get(a).await.unwrap().lock().await.state.step = Step::TimelineSelect;
        assert_eq!(
            store.get(b).await.unwrap().lock().await.state.step,
            Step::LeadCapture
        );
    }

    #[tokio::test]
    async fn unknown_session_not_found() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn remove_session() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (id, _) = store.create().await;
        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_err());
    }

    #[tokio::test]
    async fn session_age_counts_from_creation() {
        let store = SessionStore::new(Duration::from_secs(3600));
        let (id, _) = store.create().await;
        let sessions = store.sessions.read().await;
        let entry = sessions.get(&id).unwrap();
        assert!((0..=1).contains(&entry.age_secs()));
    }

    #[tokio::test]
    async fn idle_session_expires_on_access() {
        let store = SessionStore::new(Duration::ZERO);
        let (id, _) = store.create().await;
        let err = store.get(id).await.unwrap_err();
        assert!(matches!(err, SessionError::Expired { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn sweep_drops_idle_sessions() {
        let store = SessionStore::new(Duration::ZERO);
        store.create().await;
        store.create().await;
        assert_eq!(store.expire_idle().await, 2);
        assert!(store.is_empty().await);

        let fresh = SessionStore::new(Duration::from_secs(3600));
        fresh.create().await;
        assert_eq!(fresh.expire_idle().await, 0);
        assert_eq!(fresh.len().await, 1);
    }
}
