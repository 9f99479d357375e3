//! Prompt templates for the three review stages.
//!
//! Every stage sends the same message shape: a role-definition system block,
//! the fixed-language constraint, an output-format block, and one user block
//! carrying the stage inputs.

use std::fmt::Write;

use kestrel_core::PrContext;

use crate::llm::{ChatMessage, Role};

/// The language every stage is instructed to answer in, regardless of the
/// language of the pull request content.
pub const OUTPUT_LANGUAGE: &str = "English";

const CHANGE_ANALYSIS_ROLE: &str = "\
You are a highly experienced senior software engineer. Your job is to analyze \
the changes introduced by this pull request and understand its purpose and impact.";

const CODE_QUALITY_ROLE: &str = "\
You are a seasoned code quality specialist, focusing on maintainability, \
readability, and performance.";

const SUMMARY_ROLE: &str = "\
You are a technical lead who synthesizes multiple review perspectives into a \
concise final summary.";

fn language_constraint() -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: format!(
            "You must answer in {OUTPUT_LANGUAGE} no matter what language the pull request uses."
        ),
    }
}

fn system(content: impl Into<String>) -> ChatMessage {
    ChatMessage {
        role: Role::System,
        content: content.into(),
    }
}

fn user(content: String) -> ChatMessage {
    ChatMessage {
        role: Role::User,
        content,
    }
}

/// Render the per-file change list (`- path: +adds, -dels`).
///
/// # Examples
///
/// ```
/// use kestrel_core::{ChangedFile, PrContext};
/// use kestrel_review::prompt::file_changes_summary;
///
/// let ctx = PrContext {
///     title: String::new(),
///     description: String::new(),
///     state: "open".into(),
///     author: String::new(),
///     base_branch: "main".into(),
///     head_branch: "topic".into(),
///     commits: 1,
///     additions: 3,
///     deletions: 1,
///     changed_files: 1,
///     files: vec![ChangedFile {
///         path: "src/app.py".into(),
///         status: "modified".into(),
///         additions: 3,
///         deletions: 1,
///         patch: String::new(),
///     }],
/// };
/// assert_eq!(file_changes_summary(&ctx), "- src/app.py: +3, -1");
/// ```
pub fn file_changes_summary(ctx: &PrContext) -> String {
    ctx.files
        .iter()
        .map(|f| format!("- {}: +{}, -{}", f.path, f.additions, f.deletions))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the per-file diff blocks (`## path` followed by a fenced diff).
pub fn file_diffs_block(ctx: &PrContext) -> String {
    let mut out = String::new();
    for file in &ctx.files {
        let _ = write!(out, "\n## {}\n```diff\n{}\n```\n", file.path, file.patch);
    }
    out
}

/// Stage 1: analyze what the change does and why.
///
/// Uses the PR metadata, the file-change list, and the per-file diffs.
pub fn change_analysis_messages(ctx: &PrContext) -> Vec<ChatMessage> {
    let body = format!(
        "Here is the pull request information:\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - Branch: {base} -> {head}\n\
         \n\
         Here is the list of files that were changed:\n\
         {changes}\n\
         \n\
         Here is the diff for each file:\n\
         {diffs}\n\
         Please analyze the changes in this pull request and provide:\n\
         1. The main purpose of the change (what the PR is intended to achieve)\n\
         2. Key implementations (how the developer solved the problem or built the feature)\n\
         3. Impact of the changes on the system, both positive and negative",
        title = ctx.title,
        description = ctx.description,
        base = ctx.base_branch,
        head = ctx.head_branch,
        changes = file_changes_summary(ctx),
        diffs = file_diffs_block(ctx),
    );

    vec![
        system(CHANGE_ANALYSIS_ROLE),
        language_constraint(),
        system(
            "Write your final answer in markdown format. Use concise, clear language, \
             but provide enough detail for a thorough analysis.",
        ),
        user(body),
    ]
}

/// Stage 2: review the code quality of the diffs alone.
pub fn code_quality_messages(ctx: &PrContext) -> Vec<ChatMessage> {
    let body = format!(
        "Here is the code changed in the pull request:\n\
         {diffs}\n\
         Please evaluate the quality of this code from the following perspectives:\n\
         1. Code structure and organization\n\
         2. Readability and naming\n\
         3. Redundant code and reusability\n\
         4. Performance considerations\n\
         5. Testability and coverage\n\
         \n\
         For each perspective, mention what is good and what needs improvement. \
         You may suggest an improvement with example code where it helps.",
        diffs = file_diffs_block(ctx),
    );

    vec![
        system(CODE_QUALITY_ROLE),
        language_constraint(),
        system("Format your final output in markdown. Use bullet points for each area if it helps clarity."),
        user(body),
    ]
}

/// Stage 3: synthesize the first two stage outputs into a final summary.
pub fn review_summary_messages(change_analysis: &str, code_quality_review: &str) -> Vec<ChatMessage> {
    let body = format!(
        "Here are the results of reviewing the pull request from several perspectives.\n\
         \n\
         ## Change Analysis\n\
         {change_analysis}\n\
         \n\
         ## Code Quality Review\n\
         {code_quality_review}\n\
         \n\
         Please provide a summary of this review:\n\
         1. Overall assessment of the PR (1-2 sentences)\n\
         2. Key strengths (3-5 items)\n\
         3. Key improvements (3-5 items)\n\
         4. Suggested actions for the developer"
    );

    vec![
        system(SUMMARY_ROLE),
        language_constraint(),
        system(
            "Write your final summary in markdown format with short headings for clarity. \
             You may use ```suggestion``` blocks to propose actual code changes.",
        ),
        user(body),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_core::ChangedFile;

    fn sample_context() -> PrContext {
        PrContext {
            title: "Add retry logic".into(),
            description: "Wraps outbound calls with retry".into(),
            state: "open".into(),
            author: "octocat".into(),
            base_branch: "main".into(),
            head_branch: "feature/retry".into(),
            commits: 2,
            additions: 12,
            deletions: 4,
            changed_files: 2,
            files: vec![
                ChangedFile {
                    path: "src/client.py".into(),
                    status: "modified".into(),
                    additions: 10,
                    deletions: 4,
                    patch: "@@ -1,2 +1,3 @@\n+import retry".into(),
                },
                ChangedFile {
                    path: "src/errors.py".into(),
                    status: "added".into(),
                    additions: 2,
                    deletions: 0,
                    patch: "@@ -0,0 +1,2 @@\n+class RetryError: ...".into(),
                },
            ],
        }
    }

    #[test]
    fn file_changes_summary_lists_every_file() {
        let summary = file_changes_summary(&sample_context());
        assert_eq!(
            summary,
            "- src/client.py: +10, -4\n- src/errors.py: +2, -0"
        );
    }

    #[test]
    fn file_diffs_block_fences_each_patch() {
        let block = file_diffs_block(&sample_context());
        assert!(block.contains("## src/client.py"));
        assert!(block.contains("```diff\n@@ -1,2 +1,3 @@\n+import retry\n```"));
        assert!(block.contains("## src/errors.py"));
    }

    #[test]
    fn change_analysis_uses_metadata_and_diffs() {
        let messages = change_analysis_messages(&sample_context());
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[3].role, Role::User);
        let body = &messages[3].content;
        assert!(body.contains("Add retry logic"));
        assert!(body.contains("main -> feature/retry"));
        assert!(body.contains("- src/client.py: +10, -4"));
        assert!(body.contains("+import retry"));
    }

    #[test]
    fn code_quality_uses_only_diffs() {
        let messages = code_quality_messages(&sample_context());
        let body = &messages[3].content;
        assert!(body.contains("+import retry"));
        // Stage 2 never sees PR metadata.
        assert!(!body.contains("Add retry logic"));
        assert!(!body.contains("feature/retry"));
    }

    #[test]
    fn summary_carries_both_prior_outputs() {
        let messages = review_summary_messages("ANALYSIS-TEXT", "QUALITY-TEXT");
        let body = &messages[3].content;
        assert!(body.contains("ANALYSIS-TEXT"));
        assert!(body.contains("QUALITY-TEXT"));
        let analysis_pos = body.find("ANALYSIS-TEXT").unwrap();
        let quality_pos = body.find("QUALITY-TEXT").unwrap();
        assert!(analysis_pos < quality_pos);
    }

    #[test]
    fn every_stage_pins_the_output_language() {
        let ctx = sample_context();
        for messages in [
            change_analysis_messages(&ctx),
            code_quality_messages(&ctx),
            review_summary_messages("a", "q"),
        ] {
            assert!(messages
                .iter()
                .any(|m| m.role == Role::System && m.content.contains(OUTPUT_LANGUAGE)));
        }
    }
}
