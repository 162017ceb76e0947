//! Wire frames: boundary parsing of inbound text and outbound serialization.
//!
//! Inbound parsing returns a tagged result rather than an error type: a frame
//! can be well-formed, deliberately ignored, or structurally invalid, and the
//! orchestrator treats each differently.

use serde::Serialize;

use agora_core::ChatMessage;

/// Error text for frames that are not valid JSON or have the wrong shape.
pub const ERR_INVALID_FORMAT: &str = "Invalid message format";

/// Error text for a message addressed to an unknown session.
pub const ERR_SESSION_NOT_FOUND: &str = "Session not found";

/// Result of parsing one inbound text frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundFrame {
    /// A well-formed `{"type":"message","content":...}` frame.
    Message {
        /// User message text.
        content: String,
    },
    /// Valid JSON whose `type` is not `"message"`; produces no reply.
    Ignored,
    /// Not JSON, or a `"message"` frame without a string `content`.
    Invalid,
}

/// Parse an inbound text frame.
#[must_use]
pub fn parse_inbound(text: &str) -> InboundFrame {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return InboundFrame::Invalid;
    };
    if value.get("type").and_then(|t| t.as_str()) != Some("message") {
        return InboundFrame::Ignored;
    }
    match value.get("content").and_then(|c| c.as_str()) {
        Some(content) => InboundFrame::Message {
            content: content.to_owned(),
        },
        None => InboundFrame::Invalid,
    }
}

/// An outbound frame.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    /// A delivered chat message: `{"type":"message","message":{...}}`.
    Message {
        /// Always the literal `"message"`.
        #[serde(rename = "type")]
        kind: &'static str,
        /// The persisted message.
        message: ChatMessage,
    },
    /// A protocol error: `{"error":"..."}`.
    Error {
        /// Error text.
        error: String,
    },
}

impl OutboundFrame {
    /// Frame carrying a persisted chat message.
    #[must_use]
    pub fn message(message: ChatMessage) -> Self {
        Self::Message {
            kind: "message",
            message,
        }
    }

    /// Protocol-error frame.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { error: text.into() }
    }

    /// Serialize to the wire. Serialization of these shapes cannot fail.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
