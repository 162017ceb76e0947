//! Two-stage message analysis: claim extraction, then stance classification.
//!
//! Stage 1 asks the model for one line of strict JSON describing whether the
//! user message carries a claim. Stage 2 submits an extracted claim to the
//! backend as a comment and reads back per-question stance classifications.
//!
//! Both stages return typed errors; the orchestrator decides that every one
//! of them degrades silently rather than failing the turn.

use std::sync::Arc;

use tracing::{debug, instrument};

use agora_backend::{BackendClient, BackendError, CommentResponse};
use agora_core::{ChatMessage, ClaimAnalysis, CommentId, ProjectId, RelatedQuestion};
use agora_llm::{ChatTurn, GeminiClient, GenerationConfig, LlmError};

/// Outcome of a successful stage-2 submission.
#[derive(Clone, Debug)]
pub struct ClaimSubmission {
    /// Id of the comment created on the backend.
    pub comment_id: CommentId,
    /// Questions the claim was classified against, one stance per question.
    pub related: Vec<RelatedQuestion>,
}

/// Why a claim-extraction model reply was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClaimReplyError {
    /// The reply was not valid JSON.
    #[error("claim reply is not valid JSON")]
    NotJson,
    /// `hasContent` was missing or not a boolean.
    #[error("claim reply has no boolean hasContent field")]
    MissingFlag,
    /// `hasContent` was true but `content` was not a string.
    #[error("claim reply content is not a string")]
    ContentNotString,
}

/// Stage-1 failure: the model call itself, or its reply's structure.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The extraction call failed.
    #[error("{0}")]
    Llm(#[from] LlmError),
    /// The reply did not match the required JSON shape.
    #[error("{0}")]
    Reply(#[from] ClaimReplyError),
}

/// Build the claim-extraction prompt.
///
/// Embeds the last history turns as `<role label>: <content>` lines plus the
/// newest user message, and demands exactly one line of strict JSON.
#[must_use]
pub fn claim_extraction_prompt(history: &[ChatMessage], message: &str) -> String {
    let mut prompt = String::from(
        "あなたは会話分析アシスタントです。以下の会話履歴と最新のユーザー発言から、\
         議論の対象となり得る主張を抽出してください。\n\n会話履歴:\n",
    );
    if history.is_empty() {
        prompt.push_str("(なし)\n");
    } else {
        for entry in history {
            prompt.push_str(entry.sender.label());
            prompt.push_str(": ");
            prompt.push_str(&entry.content);
            prompt.push('\n');
        }
    }
    prompt.push_str("\n最新の発言: ");
    prompt.push_str(message);
    prompt.push_str(
        "\n\n出力は次の形式の厳密なJSONを1行だけ返してください。他のテキストは一切含めないでください。\n\
         {\"hasContent\": true, \"content\": \"抽出した主張\"}\n\
         主張が含まれない場合は {\"hasContent\": false} を返してください。",
    );
    prompt
}

/// Validate a claim-extraction model reply.
///
/// Schema: `hasContent` must be a boolean; when true, `content` must be a
/// string. Anything else is a structural error.
pub fn parse_claim_reply(reply: &str) -> Result<ClaimAnalysis, ClaimReplyError> {
    let value: serde_json::Value =
        serde_json::from_str(reply.trim()).map_err(|_| ClaimReplyError::NotJson)?;
    let Some(has_content) = value.get("hasContent").and_then(serde_json::Value::as_bool) else {
        return Err(ClaimReplyError::MissingFlag);
    };
    if !has_content {
        return Ok(ClaimAnalysis::none());
    }
    match value.get("content").and_then(|c| c.as_str()) {
        Some(content) => Ok(ClaimAnalysis::claim(content)),
        None => Err(ClaimReplyError::ContentNotString),
    }
}

/// Select one stance per analyzed question: the first entry, which the
/// backend orders highest-confidence first. Questions with no stance entry
/// are dropped.
#[must_use]
pub fn related_questions(response: &CommentResponse) -> Vec<RelatedQuestion> {
    response
        .analyzed_questions
        .iter()
        .filter_map(|question| {
            let top = question.stances.first()?;
            Some(RelatedQuestion {
                id: question.id.clone(),
                text: question.text.clone(),
                stance_id: top.stance_id.clone(),
                confidence: top.confidence,
            })
        })
        .collect()
}

/// The two-stage analyzer.
pub struct MessageAnalyzer {
    llm: Arc<GeminiClient>,
    backend: Arc<BackendClient>,
}

impl MessageAnalyzer {
    /// Create an analyzer over the two collaborators.
    #[must_use]
    pub fn new(llm: Arc<GeminiClient>, backend: Arc<BackendClient>) -> Self {
        Self { llm, backend }
    }

    /// Stage 1: extract a claim from the newest user message.
    #[instrument(skip_all)]
    pub async fn extract_claim(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<ClaimAnalysis, AnalysisError> {
        let prompt = claim_extraction_prompt(history, message);
        let reply = self
            .llm
            .generate(&[ChatTurn::user(prompt)], &GenerationConfig::default())
            .await?;
        let analysis = parse_claim_reply(&reply)?;
        debug!(has_claim = analysis.has_claim, "claim extraction complete");
        Ok(analysis)
    }

    /// Stage 2: submit the claim and collect stance classifications.
    #[instrument(skip_all, fields(project_id = %project_id))]
    pub async fn submit_claim(
        &self,
        project_id: &ProjectId,
        content: &str,
    ) -> Result<ClaimSubmission, BackendError> {
        let response = self.backend.submit_comment(project_id, content).await?;
        let related = related_questions(&response);
        debug!(
            comment_id = %response.comment.id,
            related_count = related.len(),
            "claim submitted"
        );
        Ok(ClaimSubmission {
            comment_id: response.comment.id,
            related,
        })
    }
}
