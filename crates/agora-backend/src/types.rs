//! Wire types for the backend REST API (camelCase on the wire).

use serde::{Deserialize, Serialize};

use agora_core::{CommentId, Question, QuestionId, StanceId};

/// `GET /projects/{id}` response. Only `questions` is read; other fields
/// of the foreign payload are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectResponse {
    /// Questions configured for the project, in backend order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// `POST /projects/{id}/comments` request body.
///
/// `sourceUrl` is serialized as an explicit `null`, matching what the
/// backend expects from chat-originated comments.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Claim text.
    pub content: String,
    /// Fixed marker distinguishing chat comments from imported ones.
    pub source_type: &'static str,
    /// Always absent for chat comments.
    pub source_url: Option<String>,
}

impl CommentRequest {
    /// Build the request for a chat-extracted claim.
    #[must_use]
    pub fn chat_claim(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_type: "other",
            source_url: None,
        }
    }
}

/// `POST /projects/{id}/comments` response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    /// The created comment.
    pub comment: CommentRecord,
    /// Per-question stance classifications, ranked by the backend.
    #[serde(default)]
    pub analyzed_questions: Vec<AnalyzedQuestion>,
}

/// The created comment record. The backend uses Mongo-style `_id`.
#[derive(Clone, Debug, Deserialize)]
pub struct CommentRecord {
    /// Comment ID.
    #[serde(rename = "_id")]
    pub id: CommentId,
}

/// One question the comment was classified against.
#[derive(Clone, Debug, Deserialize)]
pub struct AnalyzedQuestion {
    /// Question ID.
    pub id: QuestionId,
    /// Question text.
    pub text: String,
    /// Stance entries, highest-confidence first (upstream ordering).
    #[serde(default)]
    pub stances: Vec<StanceClassification>,
}

/// One ranked stance classification.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceClassification {
    /// Question this classification belongs to.
    pub question_id: QuestionId,
    /// Classified stance.
    pub stance_id: StanceId,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}
