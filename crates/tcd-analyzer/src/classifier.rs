//! Transitivity classifier
//!
//! For every token tagged `VERB`, the first direct child labelled `obj` or
//! `dobj` becomes the verb's direct object. Verbs without one are
//! intransitive. Only the first qualifying child is reported.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use tcd_core::{AnalysisResult, Annotator, ClauseRecord, Parse, Result};

use crate::splitter::split_fragments;

/// Classify every verb of a parse, in surface order
pub fn extract_clauses(parse: &Parse) -> Vec<ClauseRecord> {
    parse
        .verb_positions()
        .filter_map(|idx| {
            let verb = parse.get(idx)?;
            let object = parse
                .children(idx)
                .find(|child| child.is_direct_object())
                .map(|child| child.text.clone());
            Some(ClauseRecord::new(verb.text.clone(), object))
        })
        .collect()
}

/// Classifier bound to an annotator
///
/// The annotator is injected once and shared; the classifier keeps no other
/// state, so results are rebuilt from scratch on every call.
#[derive(Clone)]
pub struct TransitivityClassifier {
    annotator: Arc<dyn Annotator>,
}

impl TransitivityClassifier {
    /// Create a classifier using the given annotator
    pub fn new(annotator: Arc<dyn Annotator>) -> Self {
        Self { annotator }
    }

    /// The annotator this classifier parses with
    pub fn annotator(&self) -> &dyn Annotator {
        self.annotator.as_ref()
    }

    /// Classify the verbs of a single fragment
    pub async fn classify(&self, fragment: &str) -> Result<AnalysisResult> {
        let parse = self.annotator.parse(fragment).await?;
        let clauses = extract_clauses(&parse);

        tracing::debug!(
            fragment = %fragment,
            tokens = parse.len(),
            verbs = clauses.len(),
            "Fragment classified"
        );

        Ok(AnalysisResult::new(fragment, clauses))
    }

    /// Split text into fragments and classify each in order
    ///
    /// Blank input yields no fragments and never reaches the annotator. The
    /// first annotator failure aborts the whole analysis.
    pub async fn analyze(&self, text: &str) -> Result<Vec<AnalysisResult>> {
        let fragments = split_fragments(text);
        let mut results = Vec::with_capacity(fragments.len());

        for fragment in &fragments {
            results.push(self.classify(fragment).await?);
        }

        tracing::info!(
            annotator = self.annotator.name(),
            fragments = results.len(),
            clauses = results.iter().map(|r| r.clauses.len()).sum::<usize>(),
            "Analysis complete"
        );

        Ok(results)
    }
}

impl std::fmt::Debug for TransitivityClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitivityClassifier")
            .field("annotator", &self.annotator.name())
            .field("model", &self.annotator.model())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
