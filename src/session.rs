//! Per-user session state: an append-only transcript and an in-memory store.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::constants;
use crate::message::{Message, Role};

/// Ordered chat history. Entries can be added but never removed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of pipeline outputs, i.e. everything except the user echoes.
    pub fn reply_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role != Role::User).count()
    }

    /// The messages produced by the most recent submission: the last user
    /// message and everything after it.
    pub fn last_run(&self) -> &[Message] {
        let start = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::User)
            .unwrap_or(0);
        &self.messages[start..]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub transcript: Transcript,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_seen: now,
            transcript: Transcript::new(),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, idle: Duration) -> bool {
        now - self.last_seen > idle
    }
}

/// Sessions live until reset, idle expiry, or eviction once the store is full.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    idle: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(
            Duration::seconds(constants::SESSION_IDLE_SECS),
            constants::MAX_SESSIONS,
        )
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            idle,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        let mut sessions = self.sessions.write().await;

        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.idle));
        if sessions.len() < before {
            debug!(expired = before - sessions.len(), "Dropped idle sessions");
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .values()
                .min_by_key(|s| s.last_seen)
                .map(|s| s.id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!(id = %oldest, "Session store full, evicted least recently used session");
        }

        sessions.insert(id, session);
        info!(%id, "Session started");
        id
    }

    /// Looks up a live session and marks it as used. Expired sessions are
    /// removed and reported as missing.
    fn touch<'a>(&self, sessions: &'a mut HashMap<Uuid, Session>, id: Uuid) -> Option<&'a mut Session> {
        let now = Utc::now();
        if sessions.get(&id)?.is_expired(now, self.idle) {
            sessions.remove(&id);
            info!(%id, "Session expired");
            return None;
        }
        let session = sessions.get_mut(&id)?;
        session.last_seen = now;
        Some(session)
    }

    /// A snapshot of the session, if it exists.
    pub async fn get(&self, id: Uuid) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, id).map(|s| s.clone())
    }

    pub async fn contains(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        self.touch(&mut sessions, id).is_some()
    }

    /// Appends to a session's transcript. Returns the new length, or `None`
    /// if the session has ended.
    pub async fn append(&self, id: Uuid, messages: Vec<Message>) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        let session = self.touch(&mut sessions, id)?;
        session.transcript.extend(messages);
        Some(session.transcript.len())
    }

    /// Ends a session, dropping its transcript.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(%id, "Session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
