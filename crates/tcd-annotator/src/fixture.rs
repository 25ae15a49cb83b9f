//! Pre-parsed CoNLL-U annotator
//!
//! Serves parses from a CoNLL-U document instead of running a model.
//! Sentences are looked up by their text, so the document must carry
//! `# text =` comments (or forms that rebuild to the queried text).
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tcd_core::{Annotator, Parse, Result, TcdError};

use crate::treebank;

/// Annotator backed by a pre-parsed CoNLL-U document
#[derive(Debug, Clone)]
pub struct ConlluAnnotator {
    parses: HashMap<String, Parse>,
    source: String,
}

impl ConlluAnnotator {
    /// Build from CoNLL-U text
    pub fn from_conllu(input: &str) -> Result<Self> {
        Self::build(input, "inline".to_string())
    }

    /// Load from a CoNLL-U file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TcdError::ModelUnavailable(format!(
                "cannot read CoNLL-U file {}: {e}",
                path.display()
            ))
        })?;
        Self::build(&content, path.display().to_string())
    }

    fn build(input: &str, source: String) -> Result<Self> {
        let mut parses = HashMap::new();
        for sentence in treebank::read_sentences(input)? {
            let key = lookup_key(&sentence.text);
            let parse = treebank::flatten(vec![sentence])?;
            if parses.insert(key.clone(), parse).is_some() {
                tracing::debug!(sentence = %key, "duplicate sentence in CoNLL-U, keeping last");
            }
        }
        Ok(Self { parses, source })
    }

    /// Number of distinct sentences available
    pub fn len(&self) -> usize {
        self.parses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parses.is_empty()
    }

    /// Where the annotations were loaded from
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[async_trait]
impl Annotator for ConlluAnnotator {
    async fn parse(&self, text: &str) -> Result<Parse> {
        let key = lookup_key(text);
        self.parses
            .get(&key)
            .cloned()
            .ok_or_else(|| TcdError::Annotator(format!("no annotation for '{key}'")))
    }

    fn name(&self) -> &str {
        "conllu"
    }

    fn model(&self) -> &str {
        &self.source
    }
}

/// Normalize sentence text for lookup
///
/// Fragments arrive without their final period, while treebank text keeps
/// it, so trailing periods and surrounding whitespace are ignored.
fn lookup_key(text: &str) -> String {
    text.trim().trim_end_matches('.').trim_end().to_string()
}
