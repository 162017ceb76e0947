//! Per-message turn pipeline.
//!
//! One inbound text frame runs through: parse, history append, the
//! `questions` command shortcut, two-stage analysis, context resolution and
//! reply generation. Only protocol-level failures (malformed frame, unknown
//! session) surface as error frames; every analysis or backend failure
//! degrades the turn silently and a reply is still produced.

use std::sync::Arc;

use tracing::{instrument, warn};

use agora_backend::BackendClient;
use agora_core::{
    ChatMessage, ClaimAnalysis, ProjectId, Question, RelatedQuestion, Sender, SessionId,
    StanceContext, PROMPT_HISTORY_LIMIT,
};
use agora_llm::GeminiClient;

use crate::analyzer::MessageAnalyzer;
use crate::composer::ReplyComposer;
use crate::frames::{
    parse_inbound, InboundFrame, OutboundFrame, ERR_INVALID_FORMAT, ERR_SESSION_NOT_FOUND,
};
use crate::resolver::StanceContextResolver;
use crate::store::SessionStore;

/// Header line of the `questions` command reply.
pub const QUESTION_LIST_HEADER: &str = "論点一覧:";

/// Reply sent when the project has no questions registered.
pub const NO_QUESTIONS_REPLY: &str = "このプロジェクトには論点がまだ登録されていません。";

/// Format the `questions` command reply.
#[must_use]
pub fn questions_reply(questions: &[Question]) -> String {
    if questions.is_empty() {
        return NO_QUESTIONS_REPLY.to_owned();
    }
    let mut reply = String::from(QUESTION_LIST_HEADER);
    for (index, question) in questions.iter().enumerate() {
        reply.push('\n');
        reply.push_str(&format!("{}. {}", index + 1, question.text));
    }
    reply
}

/// Drives one session's turns from inbound frames to outbound frames.
pub struct Orchestrator {
    store: Arc<SessionStore>,
    backend: Arc<BackendClient>,
    analyzer: MessageAnalyzer,
    resolver: StanceContextResolver,
    composer: ReplyComposer,
}

impl Orchestrator {
    /// Wire up the pipeline stages over shared clients.
    #[must_use]
    pub fn new(
        store: Arc<SessionStore>,
        llm: Arc<GeminiClient>,
        backend: Arc<BackendClient>,
    ) -> Self {
        Self {
            store,
            analyzer: MessageAnalyzer::new(Arc::clone(&llm), Arc::clone(&backend)),
            resolver: StanceContextResolver::new(Arc::clone(&backend)),
            composer: ReplyComposer::new(llm),
            backend,
        }
    }

    /// Handle one inbound text frame.
    ///
    /// Returns the serialized outbound frame to send, or `None` when the
    /// frame is silently ignored.
    #[instrument(skip_all, fields(session_id = %session_id, project_id = %project_id))]
    pub async fn handle_text(
        &self,
        session_id: &SessionId,
        project_id: &ProjectId,
        raw: &str,
    ) -> Option<String> {
        let content = match parse_inbound(raw) {
            InboundFrame::Message { content } => content,
            InboundFrame::Ignored => return None,
            InboundFrame::Invalid => {
                return Some(OutboundFrame::error(ERR_INVALID_FORMAT).to_json());
            }
        };

        // Snapshot the prompt history before the new message joins it; the
        // composer appends the new message as its own final turn.
        let history = self.store.recent_history(session_id, PROMPT_HISTORY_LIMIT);
        if self
            .store
            .append_message(session_id, &content, Sender::User)
            .is_none()
        {
            return Some(OutboundFrame::error(ERR_SESSION_NOT_FOUND).to_json());
        }

        let questions = self.project_questions(project_id).await;

        let reply = if content.trim().eq_ignore_ascii_case("questions") {
            questions_reply(&questions)
        } else {
            let related = self.analyze(project_id, &history, &content).await;
            let context = self.resolve_context(project_id, &related).await;
            self.composer
                .generate_reply(&questions, context.as_ref(), &history, &content)
                .await
        };

        let bot_message = self
            .store
            .append_message(session_id, &reply, Sender::Bot)?;
        Some(OutboundFrame::message(bot_message).to_json())
    }

    /// Fetch project questions, degrading a failure to an empty list.
    async fn project_questions(&self, project_id: &ProjectId) -> Vec<Question> {
        match self.backend.get_project_questions(project_id).await {
            Ok(questions) => questions,
            Err(error) => {
                warn!(%error, "question fetch failed, continuing without questions");
                Vec::new()
            }
        }
    }

    /// Run both analysis stages, degrading any failure to no related
    /// questions.
    async fn analyze(
        &self,
        project_id: &ProjectId,
        history: &[ChatMessage],
        content: &str,
    ) -> Vec<RelatedQuestion> {
        let claim = match self.analyzer.extract_claim(history, content).await {
            Ok(claim) => claim,
            Err(error) => {
                warn!(%error, "claim extraction failed, treating message as claim-free");
                ClaimAnalysis::none()
            }
        };
        let Some(claim_content) = claim.content.filter(|_| claim.has_claim) else {
            return Vec::new();
        };
        match self.analyzer.submit_claim(project_id, &claim_content).await {
            Ok(submission) => submission.related,
            Err(error) => {
                warn!(%error, "claim submission failed, continuing without classification");
                Vec::new()
            }
        }
    }

    /// Resolve stance context, degrading a failure to none.
    async fn resolve_context(
        &self,
        project_id: &ProjectId,
        related: &[RelatedQuestion],
    ) -> Option<StanceContext> {
        match self.resolver.resolve(project_id, related).await {
            Ok(context) => context,
            Err(error) => {
                warn!(%error, "stance-analysis fetch failed, continuing without context");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::GENERATION_FAILURE_REPLY;
    use agora_core::QuestionId;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn question(id: &str, text: &str) -> Question {
        Question {
            id: QuestionId::from(id),
            text: text.into(),
            stances: Vec::new(),
        }
    }

    // ── questions_reply ───────────────────────────────────────────────

    #[test]
    fn questions_reply_lists_numbered_questions() {
        let reply = questions_reply(&[
            question("q1", "自転車レーンを増やすべきか"),
            question("q2", "駐輪場を有料化すべきか"),
        ]);
        assert_eq!(
            reply,
            "論点一覧:\n1. 自転車レーンを増やすべきか\n2. 駐輪場を有料化すべきか"
        );
    }

    #[test]
    fn questions_reply_without_questions() {
        assert_eq!(questions_reply(&[]), NO_QUESTIONS_REPLY);
    }

    // ── handle_text ───────────────────────────────────────────────────

    fn orchestrator_against(uri: &str) -> (Arc<SessionStore>, Orchestrator) {
        let store = Arc::new(SessionStore::new());
        let orchestrator = Orchestrator::new(
            Arc::clone(&store),
            Arc::new(GeminiClient::new("k", "gemini-2.0-flash").with_base_url(uri)),
            Arc::new(BackendClient::new(uri, "k")),
        );
        (store, orchestrator)
    }

    #[tokio::test]
    async fn invalid_frame_yields_error() {
        let (store, orchestrator) = orchestrator_against("http://127.0.0.1:1");
        let session = store.create(ProjectId::from("p1"));
        let out = orchestrator
            .handle_text(&session.id, &session.project_id, "not json")
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&out).unwrap(),
            json!({"error": "Invalid message format"})
        );
    }

    #[tokio::test]
    async fn non_message_frame_is_ignored() {
        let (store, orchestrator) = orchestrator_against("http://127.0.0.1:1");
        let session = store.create(ProjectId::from("p1"));
        let out = orchestrator
            .handle_text(&session.id, &session.project_id, r#"{"type":"ping"}"#)
            .await;
        assert!(out.is_none());
        assert!(store.recent_history(&session.id, 10).is_empty());
    }

    #[tokio::test]
    async fn unknown_session_yields_error() {
        let (_store, orchestrator) = orchestrator_against("http://127.0.0.1:1");
        let out = orchestrator
            .handle_text(
                &SessionId::new(),
                &ProjectId::from("p1"),
                r#"{"type":"message","content":"hi"}"#,
            )
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&out).unwrap(),
            json!({"error": "Session not found"})
        );
    }

    #[tokio::test]
    async fn questions_command_lists_project_questions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "questions": [{"id": "q1", "text": "Should X?"}]
            })))
            .mount(&server)
            .await;

        let (store, orchestrator) = orchestrator_against(&server.uri());
        let session = store.create(ProjectId::from("p1"));
        let out = orchestrator
            .handle_text(
                &session.id,
                &session.project_id,
                r#"{"type":"message","content":"  Questions "}"#,
            )
            .await
            .unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["message"]["sender"], "bot");
        assert_eq!(frame["message"]["content"], "論点一覧:\n1. Should X?");

        // No generation call should have happened for the shortcut.
        let history = store.recent_history(&session.id, 10);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[1].sender, Sender::Bot);
    }

    #[tokio::test]
    async fn questions_command_with_unreachable_backend_reports_none() {
        let (store, orchestrator) = orchestrator_against("http://127.0.0.1:1");
        let session = store.create(ProjectId::from("p1"));
        let out = orchestrator
            .handle_text(
                &session.id,
                &session.project_id,
                r#"{"type":"message","content":"questions"}"#,
            )
            .await
            .unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(frame["message"]["content"], NO_QUESTIONS_REPLY);
    }

    #[tokio::test]
    async fn every_collaborator_down_still_produces_a_reply() {
        let (store, orchestrator) = orchestrator_against("http://127.0.0.1:1");
        let session = store.create(ProjectId::from("p1"));
        let out = orchestrator
            .handle_text(
                &session.id,
                &session.project_id,
                r#"{"type":"message","content":"賛成です"}"#,
            )
            .await
            .unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(frame["type"], "message");
        assert_eq!(frame["message"]["content"], GENERATION_FAILURE_REPLY);
        assert_eq!(store.recent_history(&session.id, 10).len(), 2);
    }

    #[tokio::test]
    async fn full_pipeline_uses_context_in_generation() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/projects/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "questions": [{"id": "q1", "text": "Should X?"}]
            })))
            .mount(&server)
            .await;

        // Claim extraction: matched by its strict-JSON instruction marker.
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(body_string_contains("hasContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [
                    {"text": "{\"hasContent\": true, \"content\": \"Xに賛成\"}"}
                ]}}]
            })))
            .mount(&server)
            .await;

        // Reply generation: any other generateContent call.
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "では反対の立場から。"}]}}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/projects/p1/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "comment": {"_id": "c1"},
                "analyzedQuestions": [{
                    "id": "q1",
                    "text": "Should X?",
                    "stances": [{"questionId": "q1", "stanceId": "s1", "confidence": 0.9}]
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/projects/p1/questions/q1/stance-analysis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"summary": "split"})))
            .mount(&server)
            .await;

        let (store, orchestrator) = orchestrator_against(&server.uri());
        let session = store.create(ProjectId::from("p1"));
        let out = orchestrator
            .handle_text(
                &session.id,
                &session.project_id,
                r#"{"type":"message","content":"Xに賛成です"}"#,
            )
            .await
            .unwrap();
        let frame: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(frame["message"]["content"], "では反対の立場から。");
    }
}
