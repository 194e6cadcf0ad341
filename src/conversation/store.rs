use super::state::{transition, Action, SessionState, Trigger};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Identifies one user in one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub channel_id: u64,
    pub user_id: u64,
}

impl SessionKey {
    pub fn new(channel_id: u64, user_id: u64) -> Self {
        Self {
            channel_id,
            user_id,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.user_id)
    }
}

#[derive(Debug, Clone, Copy)]
struct Session {
    state: SessionState,
    last_active: Instant,
}

/// All live conversation sessions
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionKey, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Feed a trigger to a session and return what to do about it.
    ///
    /// The state is read, advanced and written back under one lock, so of two
    /// messages racing for the same awaiting session only one gets processed.
    /// Ignored triggers neither create a session nor refresh its activity.
    pub async fn apply(&self, key: SessionKey, trigger: Trigger) -> Action {
        self.apply_at(key, trigger, Instant::now()).await
    }

    pub(crate) async fn apply_at(&self, key: SessionKey, trigger: Trigger, now: Instant) -> Action {
        let mut sessions = self.sessions.write().await;

        let current = sessions
            .get(&key)
            .map(|session| session.state)
            .unwrap_or_default();
        let (next, action) = transition(current, trigger);

        if action != Action::Ignore {
            debug!("Session {}: {:?} -> {:?}", key, current, next);
            sessions.insert(
                key,
                Session {
                    state: next,
                    last_active: now,
                },
            );
        }

        action
    }

    /// Current state of a session; unknown sessions are idle
    pub async fn state(&self, key: SessionKey) -> SessionState {
        self.sessions
            .read()
            .await
            .get(&key)
            .map(|session| session.state)
            .unwrap_or_default()
    }

    /// Number of tracked sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions with no activity for longer than the idle timeout.
    /// Returns how many were removed.
    pub async fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| now.saturating_duration_since(session.last_active) < self.idle_timeout);

        before - sessions.len()
    }
}
