//! Stance-context resolution: pick the primary question for a turn and
//! fetch its stance-analysis report.
//!
//! Selection is deterministic: the first question whose confidence is a
//! strict maximum over everything seen so far wins. A failed report fetch
//! surfaces as an error; the orchestrator degrades it to a context-free turn.

use std::sync::Arc;

use tracing::{debug, instrument};

use agora_backend::{BackendClient, BackendError};
use agora_core::{ProjectId, RelatedQuestion, StanceContext};

/// The related question with the highest confidence.
///
/// Ties resolve to the earliest entry: only a strictly greater confidence
/// replaces the current pick.
#[must_use]
pub fn primary_question(related: &[RelatedQuestion]) -> Option<&RelatedQuestion> {
    let mut best: Option<&RelatedQuestion> = None;
    for candidate in related {
        match best {
            Some(current) if candidate.confidence <= current.confidence => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Render a stance context as the Japanese prompt block the composer embeds.
#[must_use]
pub fn context_block(context: &StanceContext) -> String {
    format!(
        "参考情報:\n\
         関連する論点: {}\n\
         ユーザーの立場の分類先: {} (確信度 {}%)\n\
         この論点に関する意見分布の分析レポート:\n{}",
        context.question_text,
        context.stance_id,
        context.confidence_percent(),
        context.report
    )
}

/// Fetches the stance-analysis report for the primary question of a turn.
pub struct StanceContextResolver {
    backend: Arc<BackendClient>,
}

impl StanceContextResolver {
    /// Create a resolver over the backend client.
    #[must_use]
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    /// Resolve the supplementary context for this turn.
    ///
    /// Returns `Ok(None)` when no question was related to the claim. A
    /// report-fetch failure is returned as-is for the caller to degrade.
    #[instrument(skip_all, fields(project_id = %project_id, candidates = related.len()))]
    pub async fn resolve(
        &self,
        project_id: &ProjectId,
        related: &[RelatedQuestion],
    ) -> Result<Option<StanceContext>, BackendError> {
        let Some(primary) = primary_question(related) else {
            return Ok(None);
        };
        let report = self
            .backend
            .get_stance_analysis(project_id, &primary.id)
            .await?;
        debug!(question_id = %primary.id, confidence = primary.confidence, "context resolved");
        Ok(Some(StanceContext {
            question_text: primary.text.clone(),
            report,
            stance_id: primary.stance_id.clone(),
            confidence: primary.confidence,
        }))
    }
}
