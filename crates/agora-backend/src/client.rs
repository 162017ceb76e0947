//! HTTP client for the deliberation-platform backend.

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

use agora_core::{ProjectId, Question, QuestionId};

use crate::error::BackendError;
use crate::types::{CommentRequest, CommentResponse, ProjectResponse};

/// Header carrying the static API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Client for the backend REST API.
pub struct BackendClient {
    /// HTTP client (reused across requests).
    client: reqwest::Client,
    /// API base URL without trailing slash.
    base_url: String,
    /// Static API key.
    api_key: String,
}

impl BackendClient {
    /// Create a new client.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            let _ = base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            let _ = headers.insert(API_KEY_HEADER, value);
        } else {
            warn!("API key contains non-header-safe characters, sending without key");
        }
        headers
    }

    /// Check the status and decode the body, mapping non-2xx to `Api`.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response.json().await.map_err(BackendError::Http)
    }

    /// Fetch the questions configured for a project.
    #[instrument(skip(self), fields(project_id = %project_id))]
    pub async fn get_project_questions(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<Question>, BackendError> {
        let url = format!("{}/projects/{project_id}", self.base_url);
        debug!("fetching project questions");
        let response = self
            .client
            .get(url)
            .headers(self.headers())
            .send()
            .await
            .map_err(BackendError::Http)?;
        let project: ProjectResponse = Self::decode(response).await?;
        Ok(project.questions)
    }

    /// Submit an extracted claim as a project comment.
    ///
    /// The response carries the created comment id and per-question stance
    /// classifications ranked by the backend.
    #[instrument(skip(self, content), fields(project_id = %project_id))]
    pub async fn submit_comment(
        &self,
        project_id: &ProjectId,
        content: &str,
    ) -> Result<CommentResponse, BackendError> {
        let url = format!("{}/projects/{project_id}/comments", self.base_url);
        debug!("submitting comment");
        let response = self
            .client
            .post(url)
            .headers(self.headers())
            .json(&CommentRequest::chat_claim(content))
            .send()
            .await
            .map_err(BackendError::Http)?;
        Self::decode(response).await
    }

    /// Fetch the stance-analysis report for one question. The payload is
    /// opaque to this system and passed through verbatim.
    #[instrument(skip(self), fields(project_id = %project_id, question_id = %question_id))]
    pub async fn get_stance_analysis(
        &self,
        project_id: &ProjectId,
        question_id: &QuestionId,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!(
            "{}/projects/{project_id}/questions/{question_id}/stance-analysis",
            self.base_url
        );
        debug!("fetching stance analysis");
        let response = self
            .client
            .get(url)
            .headers(self.headers())
            .send()
            .await
            .map_err(BackendError::Http)?;
        Self::decode(response).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(server.uri(), "secret-key")
    }

    #[test]
    fn base_url_trailing_slash_stripped() {
        let c = BackendClient::new("http://api.example/", "k");
        assert_eq!(c.base_url, "http://api.example");
    }

    #[tokio::test]
    async fn get_project_questions_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/p1"))
            .and(header(API_KEY_HEADER, "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "questions": [
                    {"id": "q1", "text": "Should X?"},
                    {"id": "q2", "text": "Should Y?", "stances": [{"id": "s1"}]}
                ]
            })))
            .mount(&server)
            .await;

        let questions = client(&server)
            .get_project_questions(&ProjectId::from("p1"))
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "Should X?");
        assert_eq!(questions[1].stances.len(), 1);
    }

    #[tokio::test]
    async fn get_project_questions_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such project"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get_project_questions(&ProjectId::from("nope"))
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::Api { status: 404, .. });
    }

    #[tokio::test]
    async fn submit_comment_sends_fixed_source_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects/p1/comments"))
            .and(header(API_KEY_HEADER, "secret-key"))
            .and(body_partial_json(json!({
                "content": "主張",
                "sourceType": "other",
                "sourceUrl": null
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "comment": {"_id": "c1"},
                "analyzedQuestions": []
            })))
            .mount(&server)
            .await;

        let resp = client(&server)
            .submit_comment(&ProjectId::from("p1"), "主張")
            .await
            .unwrap();
        assert_eq!(resp.comment.id.as_str(), "c1");
        assert!(resp.analyzed_questions.is_empty());
    }

    #[tokio::test]
    async fn submit_comment_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server)
            .submit_comment(&ProjectId::from("p1"), "主張")
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::Api { status: 500, ref message } if message == "boom");
    }

    #[tokio::test]
    async fn stance_analysis_passes_report_through() {
        let server = MockServer::start().await;
        let report = json!({"summary": "賛否が分かれている", "clusters": [1, 2]});
        Mock::given(method("GET"))
            .and(path("/projects/p1/questions/q1/stance-analysis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(report.clone()))
            .mount(&server)
            .await;

        let got = client(&server)
            .get_stance_analysis(&ProjectId::from("p1"), &QuestionId::from("q1"))
            .await
            .unwrap();
        assert_eq!(got, report);
    }

    #[tokio::test]
    async fn connection_refused_is_http_error() {
        let c = BackendClient::new("http://127.0.0.1:1", "k");
        let err = c
            .get_project_questions(&ProjectId::from("p1"))
            .await
            .unwrap_err();
        assert_matches!(err, BackendError::Http(_));
    }
}
