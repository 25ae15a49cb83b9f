//! TCD Analyzer - Transitivity analysis pipeline
//!
//! Splits input text into period-delimited fragments, classifies each
//! verb as transitive or intransitive using an injected annotator, and
//! formats the results for display.
//!
//! Author: hephaex@gmail.com

pub mod classifier;
pub mod report;
pub mod splitter;

pub use classifier::{extract_clauses, TransitivityClassifier};
pub use report::{clause_line, render_json, render_markdown, render_text, NO_VERBS};
pub use splitter::split_fragments;
