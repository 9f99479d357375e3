use kestrel_core::{KestrelError, PrContext, ReviewState};
use serde::Serialize;

use crate::llm::CompletionModel;
use crate::prompt;

/// Statistics about a review run, for verbose output.
///
/// # Examples
///
/// ```
/// use kestrel_review::pipeline::ReviewStats;
///
/// let stats = ReviewStats {
///     files_reviewed: 2,
///     additions: 12,
///     deletions: 4,
///     model_used: "gpt-4o-mini".into(),
/// };
/// assert_eq!(stats.files_reviewed, 2);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    /// Number of files sent to the reviewer after filtering.
    pub files_reviewed: usize,
    /// Total added lines across the PR.
    pub additions: u64,
    /// Total deleted lines across the PR.
    pub deletions: u64,
    /// Model identifier used for the review.
    pub model_used: String,
}

impl ReviewStats {
    /// Compute run statistics from the collected context.
    pub fn for_run(ctx: &PrContext, model: &str) -> Self {
        Self {
            files_reviewed: ctx.files.len(),
            additions: ctx.additions,
            deletions: ctx.deletions,
            model_used: model.to_string(),
        }
    }
}

/// The fixed three-stage review pipeline.
///
/// Stages run strictly in order — change analysis, code quality, summary —
/// each extending the [`ReviewState`] record by one field. There is no
/// branching and no retry; the first model error aborts the run and later
/// stages never execute.
pub struct ReviewPipeline<M> {
    model: M,
}

impl<M: CompletionModel + Sync> ReviewPipeline<M> {
    /// Create a pipeline around a completion model.
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Run all three stages and return the completed review record.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Llm`] as soon as any stage's model call fails;
    /// no partial record escapes.
    pub async fn run(&self, ctx: &PrContext) -> Result<ReviewState, KestrelError> {
        let change_analysis = self
            .model
            .complete(prompt::change_analysis_messages(ctx))
            .await?;

        let code_quality_review = self
            .model
            .complete(prompt::code_quality_messages(ctx))
            .await?;

        let review_summary = self
            .model
            .complete(prompt::review_summary_messages(
                &change_analysis,
                &code_quality_review,
            ))
            .await?;

        Ok(ReviewState {
            change_analysis: Some(change_analysis),
            code_quality_review: Some(code_quality_review),
            review_summary: Some(review_summary),
        })
    }
}
