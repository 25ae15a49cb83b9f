//! Result formatting
//!
//! Pure presentation of already-computed analysis results. Nothing here
//! touches the annotator.
//!
//! Author: hephaex@gmail.com

use tcd_core::{AnalysisResult, ClauseRecord, Result, TcdError};

/// Placeholder for fragments without verbs
pub const NO_VERBS: &str = "No verbs detected.";

/// Display value for a missing direct object
pub const NO_OBJECT: &str = "None";

/// Direct object text, or the placeholder when absent
pub fn object_display(clause: &ClauseRecord) -> &str {
    clause.direct_object().unwrap_or(NO_OBJECT)
}

/// One-line description of a clause record
pub fn clause_line(clause: &ClauseRecord) -> String {
    format!(
        "Verb: {} | Object: {} | Type: {}",
        clause.verb(),
        object_display(clause),
        clause.clause_type()
    )
}

/// Plain text report
pub fn render_text(results: &[AnalysisResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&format!("Sentence: {}\n", result.sentence));
        if result.has_verbs() {
            for clause in &result.clauses {
                out.push_str(&format!("  {}\n", clause_line(clause)));
            }
        } else {
            out.push_str(&format!("  {NO_VERBS}\n"));
        }
        out.push_str("---\n");
    }
    out
}

/// Markdown report
pub fn render_markdown(results: &[AnalysisResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&format!("### Sentence: {}\n\n", result.sentence));
        if result.has_verbs() {
            for clause in &result.clauses {
                out.push_str(&format!(
                    "- **Verb:** `{}` | **Object:** `{}` | **Type:** **{}**\n",
                    clause.verb(),
                    object_display(clause),
                    clause.clause_type()
                ));
            }
        } else {
            out.push_str(&format!("- {NO_VERBS}\n"));
        }
        out.push_str("\n---\n\n");
    }
    out
}

/// JSON report
pub fn render_json(results: &[AnalysisResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(|e| TcdError::Other(e.into()))
}
