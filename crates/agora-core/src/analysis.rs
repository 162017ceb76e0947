//! Question, stance and claim-analysis types.
//!
//! [`Question`] and [`Stance`] are backend-sourced and read-only here.
//! [`ClaimAnalysis`], [`RelatedQuestion`] and [`StanceContext`] are transient
//! per-turn values and are never stored.

use serde::{Deserialize, Serialize};

use crate::ids::{QuestionId, StanceId};

/// A deliberation question (論点) with its candidate stances.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    /// Backend question ID.
    pub id: QuestionId,
    /// Question text.
    pub text: String,
    /// Candidate stances a claim can be classified against.
    #[serde(default)]
    pub stances: Vec<Stance>,
}

/// A predefined position on a question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stance {
    /// Backend stance ID.
    pub id: StanceId,
    /// Stance label, when the backend provides one.
    #[serde(default)]
    pub label: Option<String>,
}

/// Result of claim extraction (stage 1 of message analysis).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimAnalysis {
    /// Whether the user message contained an extractable claim.
    pub has_claim: bool,
    /// The normalized claim text, present only when `has_claim` is true.
    pub content: Option<String>,
}

impl ClaimAnalysis {
    /// The empty analysis: no claim extracted.
    #[must_use]
    pub fn none() -> Self {
        Self {
            has_claim: false,
            content: None,
        }
    }

    /// An analysis carrying an extracted claim.
    #[must_use]
    pub fn claim(content: impl Into<String>) -> Self {
        Self {
            has_claim: true,
            content: Some(content.into()),
        }
    }
}

/// A question the submitted claim was classified against, with the
/// highest-ranked stance for that question.
#[derive(Clone, Debug, PartialEq)]
pub struct RelatedQuestion {
    /// Backend question ID.
    pub id: QuestionId,
    /// Question text.
    pub text: String,
    /// The stance the claim was classified into.
    pub stance_id: StanceId,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Supplementary context injected into one generation prompt.
#[derive(Clone, Debug)]
pub struct StanceContext {
    /// Text of the selected question.
    pub question_text: String,
    /// Verbatim stance-analysis report from the backend.
    pub report: serde_json::Value,
    /// The stance the bot argues from.
    pub stance_id: StanceId,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f64,
}

impl StanceContext {
    /// Confidence as a percentage with one decimal place, e.g. `"87.5"`.
    #[must_use]
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}", self.confidence * 100.0)
    }
}
