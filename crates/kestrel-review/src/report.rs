//! Markdown rendering for the finished review.
//!
//! Pure string assembly: identical state and timestamp always produce an
//! identical document.

use chrono::{DateTime, Utc};
use kestrel_core::ReviewState;

/// Placeholder when stage 3 produced no summary.
pub const MISSING_SUMMARY: &str = "The review summary could not be generated.";
/// Placeholder when stage 1 produced no analysis.
pub const MISSING_ANALYSIS: &str = "The change analysis could not be generated.";
/// Placeholder when stage 2 produced no quality review.
pub const MISSING_QUALITY: &str = "The code quality analysis could not be generated.";

const FOOTER: &str = "<sub>This review was generated automatically by an LLM-based code review bot.</sub>";

/// Render the review record as the fixed-structure comment body.
///
/// Sections appear in a fixed order: header with timestamp, overall
/// assessment, collapsible change analysis, collapsible code quality
/// analysis, footer. Missing stage outputs are replaced with a fixed
/// placeholder sentence.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use kestrel_core::ReviewState;
/// use kestrel_review::report::{render, MISSING_SUMMARY};
///
/// let state = ReviewState::default();
/// let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let md = render(&state, ts);
/// assert!(md.contains("2024-05-01 12:00:00 UTC"));
/// assert!(md.contains(MISSING_SUMMARY));
/// ```
pub fn render(state: &ReviewState, reviewed_at: DateTime<Utc>) -> String {
    let timestamp = reviewed_at.format("%Y-%m-%d %H:%M:%S UTC");

    let summary = state.review_summary.as_deref().unwrap_or(MISSING_SUMMARY);
    let analysis = state.change_analysis.as_deref().unwrap_or(MISSING_ANALYSIS);
    let quality = state
        .code_quality_review
        .as_deref()
        .unwrap_or(MISSING_QUALITY);

    let mut out = String::new();
    out.push_str("# \u{1f9d0} Code Review Results\n\n");
    out.push_str(&format!("> \u{1f552} **Reviewed at**: {timestamp}\n\n"));

    out.push_str("## \u{1f4dd} Overall Assessment\n\n");
    out.push_str(&format!("{summary}\n\n---\n\n"));

    out.push_str("<details>\n<summary><strong>\u{1f50d} Change Analysis</strong></summary>\n\n");
    out.push_str(&format!("{analysis}\n</details>\n\n"));

    out.push_str(
        "<details>\n<summary><strong>\u{2699}\u{fe0f} Code Quality Analysis</strong></summary>\n\n",
    );
    out.push_str(&format!("{quality}\n</details>\n\n"));

    out.push_str(&format!("---\n\n{FOOTER}\n"));
    out
}
