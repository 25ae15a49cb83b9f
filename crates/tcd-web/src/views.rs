//! Askama template structs for the web interface.
//!
//! Each struct corresponds to an HTML template in the templates/ directory.
//!
//! Author: hephaex@gmail.com

use askama::Template;
use tcd_analyzer::report::object_display;
use tcd_analyzer::NO_VERBS;
use tcd_core::{AnalysisResult, ClauseRecord};

/// Title shown in the browser and page header
pub const PAGE_TITLE: &str = "Transitivity Clause Detector";

/// Helper struct for one classified verb.
pub struct ClauseView {
    pub verb: String,
    pub object: String,
    pub clause_type: String,
    pub transitive: bool,
}

impl From<&ClauseRecord> for ClauseView {
    fn from(clause: &ClauseRecord) -> Self {
        Self {
            verb: clause.verb().to_string(),
            object: object_display(clause).to_string(),
            clause_type: clause.clause_type().to_string(),
            transitive: clause.direct_object().is_some(),
        }
    }
}

/// Helper struct for one analyzed fragment.
pub struct SentenceView {
    pub sentence: String,
    pub clauses: Vec<ClauseView>,
}

impl From<&AnalysisResult> for SentenceView {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            sentence: result.sentence.clone(),
            clauses: result.clauses.iter().map(ClauseView::from).collect(),
        }
    }
}

/// Input form and results page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
    /// Text to pre-fill the input area with
    pub text: String,
    pub sentences: Vec<SentenceView>,
    /// Whether an analysis ran for this request
    pub analyzed: bool,
    /// Empty when there is nothing to report
    pub error_message: String,
    pub model: String,
    /// Shown for sentences without verbs
    pub no_verbs: &'static str,
}

impl IndexTemplate {
    /// Empty form
    pub fn new(model: Option<String>) -> Self {
        Self {
            title: PAGE_TITLE,
            text: String::new(),
            sentences: Vec::new(),
            analyzed: false,
            error_message: String::new(),
            model: model.unwrap_or_default(),
            no_verbs: NO_VERBS,
        }
    }

    /// Page showing the results for `text`
    pub fn with_results(mut self, text: String, results: &[AnalysisResult]) -> Self {
        self.text = text;
        self.sentences = results.iter().map(SentenceView::from).collect();
        self.analyzed = true;
        self
    }

    /// Page showing an error banner, keeping the submitted text
    pub fn with_error(mut self, text: String, message: impl Into<String>) -> Self {
        self.text = text;
        self.error_message = message.into();
        self
    }
}
