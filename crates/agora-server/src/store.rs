//! In-memory session registry.
//!
//! One process-wide map from session id to conversation state, owned by the
//! server and shared by `Arc`. Sessions live only for the lifetime of their
//! connection: the connection handler evicts its session on close.

use dashmap::DashMap;
use tracing::debug;

use agora_core::{ChatMessage, ProjectId, Sender, Session, SessionId};

/// Registry of live sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh session scoped to `project_id` and register it.
    ///
    /// Returns a clone of the inserted session.
    pub fn create(&self, project_id: ProjectId) -> Session {
        let session = Session::new(project_id);
        let _ = self.sessions.insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, project_id = %session.project_id, "session created");
        session
    }

    /// Look up a session by id.
    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Append a message to a session's history and return it.
    ///
    /// Returns `None` without mutating anything when the session id is
    /// unknown; callers must treat that as a protocol-level failure.
    pub fn append_message(
        &self,
        session_id: &SessionId,
        content: &str,
        sender: Sender,
    ) -> Option<ChatMessage> {
        let mut session = self.sessions.get_mut(session_id)?;
        Some(session.append(sender, content))
    }

    /// The last `limit` messages of a session, oldest first. Empty for
    /// unknown sessions.
    #[must_use]
    pub fn recent_history(&self, session_id: &SessionId, limit: usize) -> Vec<ChatMessage> {
        self.sessions
            .get(session_id)
            .map(|s| s.recent(limit).to_vec())
            .unwrap_or_default()
    }

    /// Evict a session. Called when its connection closes.
    pub fn remove(&self, session_id: &SessionId) {
        if self.sessions.remove(session_id).is_some() {
            debug!(session_id = %session_id, "session evicted");
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
