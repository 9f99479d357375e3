use serde::{Deserialize, Serialize};

/// Everything the review pipeline needs to know about a pull request.
///
/// Collected once from the GitHub API at the start of a run and immutable
/// thereafter.
///
/// # Examples
///
/// ```
/// use kestrel_core::PrContext;
///
/// let ctx = PrContext {
///     title: "Add retry logic".into(),
///     description: "Closes #12".into(),
///     state: "open".into(),
///     author: "octocat".into(),
///     base_branch: "main".into(),
///     head_branch: "feature/retry".into(),
///     commits: 3,
///     additions: 120,
///     deletions: 14,
///     changed_files: 2,
///     files: vec![],
/// };
/// assert_eq!(ctx.base_branch, "main");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrContext {
    /// Pull request title.
    pub title: String,
    /// Pull request description; empty when the author left none.
    pub description: String,
    /// Pull request state as reported by the API (`open`, `closed`).
    pub state: String,
    /// Login of the pull request author.
    pub author: String,
    /// Branch the change merges into.
    pub base_branch: String,
    /// Branch the change comes from.
    pub head_branch: String,
    /// Number of commits in the pull request.
    pub commits: u64,
    /// Total added lines across all files.
    pub additions: u64,
    /// Total deleted lines across all files.
    pub deletions: u64,
    /// Number of changed files as reported by the API, before filtering.
    pub changed_files: u64,
    /// Reviewable changed files, binary files already excluded.
    pub files: Vec<ChangedFile>,
}

/// A single changed file within a pull request.
///
/// # Examples
///
/// ```
/// use kestrel_core::ChangedFile;
///
/// let file = ChangedFile {
///     path: "src/main.py".into(),
///     status: "modified".into(),
///     additions: 10,
///     deletions: 2,
///     patch: "@@ -1,2 +1,3 @@\n+import sys".into(),
/// };
/// assert_eq!(file.status, "modified");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    /// Path of the file relative to the repository root.
    pub path: String,
    /// Change status as reported by the API (`added`, `modified`, `removed`, ...).
    pub status: String,
    /// Added lines in this file.
    pub additions: u64,
    /// Deleted lines in this file.
    pub deletions: u64,
    /// Unified diff for this file; empty when the API omits it.
    pub patch: String,
}

/// The accumulating output record of the review pipeline.
///
/// Each stage fills exactly one field, in declaration order; a field is `None`
/// only when its stage has not run. The record is extended, never rewritten.
///
/// # Examples
///
/// ```
/// use kestrel_core::ReviewState;
///
/// let mut state = ReviewState::default();
/// assert!(state.change_analysis.is_none());
/// state.change_analysis = Some("The PR adds retry logic.".into());
/// assert!(state.change_analysis.is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Stage 1: what the change does and why.
    pub change_analysis: Option<String>,
    /// Stage 2: maintainability, readability, and performance review.
    pub code_quality_review: Option<String>,
    /// Stage 3: synthesis of the first two stages.
    pub review_summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_context_serializes_camel_case() {
        let ctx = PrContext {
            title: "t".into(),
            description: String::new(),
            state: "open".into(),
            author: "a".into(),
            base_branch: "main".into(),
            head_branch: "topic".into(),
            commits: 1,
            additions: 2,
            deletions: 3,
            changed_files: 1,
            files: vec![],
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("baseBranch").is_some());
        assert!(json.get("base_branch").is_none());
        assert!(json.get("changedFiles").is_some());
    }

    #[test]
    fn changed_file_serializes_camel_case() {
        let file = ChangedFile {
            path: "a.rs".into(),
            status: "added".into(),
            additions: 1,
            deletions: 0,
            patch: String::new(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert!(json.get("additions").is_some());
        assert_eq!(json["status"], "added");
    }

    #[test]
    fn review_state_starts_empty() {
        let state = ReviewState::default();
        assert!(state.change_analysis.is_none());
        assert!(state.code_quality_review.is_none());
        assert!(state.review_summary.is_none());
    }

    #[test]
    fn review_state_roundtrips_through_json() {
        let state = ReviewState {
            change_analysis: Some("analysis".into()),
            code_quality_review: Some("quality".into()),
            review_summary: None,
        };
        let json = serde_json::to_string(&state).unwrap();
        let parsed: ReviewState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.change_analysis.as_deref(), Some("analysis"));
        assert!(parsed.review_summary.is_none());
    }
}
