//! TCD Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the detector:
//! - Annotation models (tokens and dependency parses)
//! - Transitivity results (clause records, analysis results)
//! - Common error types
//! - The annotator capability trait
//! - Configuration management
//!
//! Author: hephaex@gmail.com

pub mod config;

pub use config::{
    AnnotatorBackend, AnnotatorConfig, AppConfig, ConfigError, LoggingConfig, ServerConfig,
};

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for detector operations
#[derive(Error, Debug)]
pub enum TcdError {
    #[error("Annotator error: {0}")]
    Annotator(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid annotation at line {line}: {message}")]
    InvalidAnnotation { line: usize, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for TcdError {
    fn from(err: ConfigError) -> Self {
        TcdError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TcdError>;

// ============================================================================
// Annotation Models
// ============================================================================

/// Universal POS tag for verbs
pub const VERB_TAG: &str = "VERB";

/// Dependency labels treated as direct-object markers
pub const OBJECT_LABELS: [&str; 2] = ["dobj", "obj"];

/// A single token of an annotator parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Surface form
    pub text: String,

    /// Universal part-of-speech tag (e.g. "VERB", "NOUN")
    pub upos: String,

    /// Dependency relation to the head
    pub deprel: String,

    /// Position of the syntactic head in the parse (None for the root)
    pub head: Option<usize>,
}

impl Token {
    /// Create a new token
    pub fn new(
        text: impl Into<String>,
        upos: impl Into<String>,
        deprel: impl Into<String>,
        head: Option<usize>,
    ) -> Self {
        Self {
            text: text.into(),
            upos: upos.into(),
            deprel: deprel.into(),
            head,
        }
    }

    /// Whether the token is tagged as a verb
    pub fn is_verb(&self) -> bool {
        self.upos == VERB_TAG
    }

    /// Whether the token's relation marks a direct object
    pub fn is_direct_object(&self) -> bool {
        OBJECT_LABELS.contains(&self.deprel.as_str())
    }
}

/// Dependency parse of a piece of text
///
/// Tokens are stored in surface order. Heads refer to positions in the
/// same token list, so a parse spanning several sentences is a forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parse {
    tokens: Vec<Token>,
}

impl Parse {
    /// Create a parse, rejecting heads that point outside the token list
    pub fn new(tokens: Vec<Token>) -> Result<Self> {
        let len = tokens.len();
        if let Some((idx, token)) = tokens
            .iter()
            .enumerate()
            .find(|(idx, t)| t.head.is_some_and(|h| h >= len || h == *idx))
        {
            return Err(TcdError::Validation(format!(
                "token {idx} ({}) has invalid head {:?}",
                token.text, token.head
            )));
        }
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Direct syntactic children of the token at `index`, in surface order
    pub fn children(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .filter(move |t| t.head == Some(index))
    }

    /// Positions of all tokens tagged as verbs
    pub fn verb_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_verb())
            .map(|(idx, _)| idx)
    }
}

// ============================================================================
// Transitivity Models
// ============================================================================

/// Transitivity of a verb within a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ClauseType {
    Transitive,
    Intransitive,
}

impl ClauseType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transitive => "Transitive",
            Self::Intransitive => "Intransitive",
        }
    }
}

impl std::fmt::Display for ClauseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-verb classification record
///
/// The clause type is derived from the presence of a direct object, so a
/// record can never be `Transitive` without an object or the reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClauseRecord {
    verb: String,
    direct_object: Option<String>,
    clause_type: ClauseType,
}

impl ClauseRecord {
    /// Create a record for a verb and its direct object, if any
    pub fn new(verb: impl Into<String>, direct_object: Option<String>) -> Self {
        let clause_type = if direct_object.is_some() {
            ClauseType::Transitive
        } else {
            ClauseType::Intransitive
        };
        Self {
            verb: verb.into(),
            direct_object,
            clause_type,
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn direct_object(&self) -> Option<&str> {
        self.direct_object.as_deref()
    }

    pub fn clause_type(&self) -> ClauseType {
        self.clause_type
    }
}

/// Analysis of a single fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Fragment text as analyzed
    pub sentence: String,

    /// Clause records in verb order
    pub clauses: Vec<ClauseRecord>,
}

impl AnalysisResult {
    pub fn new(sentence: impl Into<String>, clauses: Vec<ClauseRecord>) -> Self {
        Self {
            sentence: sentence.into(),
            clauses,
        }
    }

    /// Whether any verb was found in the fragment
    pub fn has_verbs(&self) -> bool {
        !self.clauses.is_empty()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Linguistic annotator capability
///
/// Implementations produce POS tags and dependency labels for the tokens of
/// a piece of text. A handle is built once and shared read-only.
#[async_trait::async_trait]
pub trait Annotator: Send + Sync {
    /// Parse text into tokens with tags, labels, and heads
    async fn parse(&self, text: &str) -> Result<Parse>;

    /// Get backend name for logging
    fn name(&self) -> &str;

    /// Model identifier used by this annotator
    fn model(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
