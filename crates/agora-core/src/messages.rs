//! Chat messages and per-connection session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, ProjectId, SessionId};

/// Number of most-recent history entries included when building prompts.
///
/// This is a hard cap on prompt size, not a tunable default.
pub const PROMPT_HISTORY_LIMIT: usize = 5;

/// Who produced a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The connected end user.
    User,
    /// The generated bot reply.
    Bot,
}

impl Sender {
    /// Japanese role label used when formatting history into prompts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "ユーザー",
            Self::Bot => "ボット",
        }
    }
}

/// A single chat message. Immutable once created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: MessageId,
    /// Message author.
    pub sender: Sender,
    /// Message text.
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new message stamped with the current time.
    #[must_use]
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Server-side conversational state bound to one connection and one project.
///
/// History is append-only and ordered by arrival.
#[derive(Clone, Debug)]
pub struct Session {
    /// Unique session ID.
    pub id: SessionId,
    /// Project this session is scoped to.
    pub project_id: ProjectId,
    /// Ordered message history.
    pub history: Vec<ChatMessage>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session with an empty history.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            id: SessionId::new(),
            project_id,
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a message and return a clone of it.
    pub fn append(&mut self, sender: Sender, content: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::new(sender, content);
        self.history.push(message.clone());
        message
    }

    /// The last `limit` history entries, oldest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> &[ChatMessage] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
    }

    #[test]
    fn sender_labels() {
        assert_eq!(Sender::User.label(), "ユーザー");
        assert_eq!(Sender::Bot.label(), "ボット");
    }

    #[test]
    fn message_wire_shape() {
        let msg = ChatMessage::new(Sender::Bot, "こんにちは");
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value["id"].is_string());
        assert_eq!(value["sender"], "bot");
        assert_eq!(value["content"], "こんにちは");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn append_preserves_arrival_order() {
        let mut session = Session::new(ProjectId::from("p1"));
        let _ = session.append(Sender::User, "first");
        let _ = session.append(Sender::Bot, "second");
        let _ = session.append(Sender::User, "third");
        let contents: Vec<&str> = session.history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn recent_returns_last_entries_in_order() {
        let mut session = Session::new(ProjectId::from("p1"));
        for i in 0..8 {
            let _ = session.append(Sender::User, format!("m{i}"));
        }
        let recent = session.recent(PROMPT_HISTORY_LIMIT);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].content, "m3");
        assert_eq!(recent[4].content, "m7");
    }

    #[test]
    fn recent_with_short_history() {
        let mut session = Session::new(ProjectId::from("p1"));
        let _ = session.append(Sender::User, "only");
        assert_eq!(session.recent(PROMPT_HISTORY_LIMIT).len(), 1);
    }

    #[test]
    fn new_session_has_empty_history() {
        let session = Session::new(ProjectId::from("p1"));
        assert!(session.history.is_empty());
        assert!(session.recent(PROMPT_HISTORY_LIMIT).is_empty());
    }
}
