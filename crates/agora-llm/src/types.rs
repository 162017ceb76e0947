//! Wire types for the Gemini `generateContent` API.

use serde::{Deserialize, Serialize};

/// Model-facing role of a conversation turn.
///
/// The Gemini wire format calls the assistant role `model`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// End-user (or instruction) turn.
    User,
    /// Assistant turn.
    Model,
}

/// One role-tagged text turn submitted to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    /// Turn role.
    pub role: TurnRole,
    /// Turn text.
    pub text: String,
}

impl ChatTurn {
    /// A user-role turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// A model-role turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Sampling parameters, serialized in Gemini's camelCase format.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Max output tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-P sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-K sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// A `contents[]` entry in the request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Turn role (`user` or `model`).
    pub role: TurnRole,
    /// Text parts.
    pub parts: Vec<GeminiPart>,
}

/// A single text part.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Part text.
    pub text: String,
}

impl From<&ChatTurn> for GeminiContent {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role,
            parts: vec![GeminiPart {
                text: turn.text.clone(),
            }],
        }
    }
}

/// Top-level `generateContent` response.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Response candidates.
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

/// A response candidate.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    /// Candidate content.
    pub content: Option<CandidateContent>,
}

/// Candidate content: a list of text parts.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateContent {
    /// Text parts.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, if any.
    #[must_use]
    pub fn first_candidate_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        if content.parts.is_empty() {
            return None;
        }
        let text: String = content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() { None } else { Some(text) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TurnRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&TurnRole::Model).unwrap(), "\"model\"");
    }

    #[test]
    fn generation_config_camel_case() {
        let config = GenerationConfig {
            max_output_tokens: Some(1024),
            temperature: Some(0.7),
            top_p: Some(0.95),
            top_k: Some(40),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["maxOutputTokens"], 1024);
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["topP"], 0.95);
        assert_eq!(value["topK"], 40);
    }

    #[test]
    fn generation_config_skips_unset_fields() {
        let value = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn content_from_turn() {
        let content = GeminiContent::from(&ChatTurn::model("はい"));
        assert_eq!(content.role, TurnRole::Model);
        assert_eq!(content.parts[0].text, "はい");
    }

    #[test]
    fn first_candidate_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "こん"}, {"text": "にちは"}]}}]
        }))
        .unwrap();
        assert_eq!(resp.first_candidate_text().as_deref(), Some("こんにちは"));
    }

    #[test]
    fn first_candidate_text_empty_cases() {
        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.first_candidate_text().is_none());

        let no_parts: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": []}}]
        }))
        .unwrap();
        assert!(no_parts.first_candidate_text().is_none());

        let no_content: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{}]})).unwrap();
        assert!(no_content.first_candidate_text().is_none());
    }
}
