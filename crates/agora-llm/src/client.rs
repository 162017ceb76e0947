//! Gemini `generateContent` client with API-key authentication.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, instrument};

use crate::error::LlmError;
use crate::types::{ChatTurn, GeminiContent, GenerateContentResponse, GenerationConfig};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client. Cheap to clone is not needed; shared via `Arc` by callers.
pub struct GeminiClient {
    /// HTTP client (reused across requests).
    client: reqwest::Client,
    /// API key, passed as a URL query parameter.
    api_key: String,
    /// Model name, e.g. `gemini-2.0-flash`.
    model: String,
    /// Override for the API base URL (tests point this at a mock server).
    base_url: Option<String>,
}

impl GeminiClient {
    /// Create a new client for the given key and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// URL of the `generateContent` endpoint.
    fn api_url(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        format!(
            "{base}/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }

    /// Build the request body from turns and sampling config.
    fn build_request_body(turns: &[ChatTurn], config: &GenerationConfig) -> serde_json::Value {
        let contents: Vec<GeminiContent> = turns.iter().map(GeminiContent::from).collect();
        serde_json::json!({
            "contents": contents,
            "generationConfig": config,
        })
    }

    /// Submit an ordered list of turns and return the generated text.
    ///
    /// The call is attempted exactly once; the caller decides how a failure
    /// degrades the turn.
    #[instrument(skip_all, fields(model = %self.model, turn_count = turns.len()))]
    pub async fn generate(
        &self,
        turns: &[ChatTurn],
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        let body = Self::build_request_body(turns, config);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!("sending generateContent request");
        let response = self
            .client
            .post(self.api_url())
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let (message, code) = parse_api_error(&body_text, status.as_u16());
            error!(
                status = status.as_u16(),
                code = code.as_deref().unwrap_or("unknown"),
                "Gemini API error"
            );
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
                code,
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(LlmError::Http)?;
        parsed.first_candidate_text().ok_or(LlmError::EmptyResponse)
    }
}

/// Parse an API error response body into (message, code).
fn parse_api_error(body: &str, status: u16) -> (String, Option<String>) {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &json["error"];
        let message = error["message"]
            .as_str()
            .unwrap_or("Unknown error")
            .to_string();
        let code = error["status"].as_str().map(String::from);
        (message, code)
    } else {
        (format!("HTTP {status}: {body}"), None)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
