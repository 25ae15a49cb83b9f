//! CoNLL-U reading
//!
//! Sentences are parsed with the `conllu` crate and mapped onto the flat
//! [`Parse`] model. Multiword token ranges (`1-2`) and empty nodes (`1.1`)
//! are dropped before parsing; only syntactic words become tokens.
//!
//! Author: hephaex@gmail.com

use udgraph::graph::{Comment, Sentence};
use conllu::io::{ReadSentence, Reader};
use udgraph::token::Token as UdToken;
use tcd_core::{Parse, Result, TcdError, Token};

const HEAD_COLUMN: usize = 6;

/// One sentence of a CoNLL-U document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConlluSentence {
    /// Sentence text from the `# text =` comment, or rebuilt from the forms
    pub text: String,

    /// Tokens with heads relative to this sentence
    pub tokens: Vec<Token>,
}

/// Parse a CoNLL-U document into sentences
pub fn read_sentences(input: &str) -> Result<Vec<ConlluSentence>> {
    let mut sentences = Vec::new();
    for block in blocks(input) {
        if let Some(sentence) = block.read()? {
            sentences.push(sentence);
        }
    }
    Ok(sentences)
}

/// Parse a CoNLL-U document into a single parse
///
/// Sentences are concatenated and their heads shifted so that every head
/// refers to a position in the combined token list.
pub fn read_parse(input: &str) -> Result<Parse> {
    flatten(read_sentences(input)?)
}

/// Concatenate sentences into one parse
pub fn flatten(sentences: Vec<ConlluSentence>) -> Result<Parse> {
    let mut tokens = Vec::new();
    for sentence in sentences {
        let offset = tokens.len();
        tokens.extend(sentence.tokens.into_iter().map(|mut t| {
            t.head = t.head.map(|h| h + offset);
            t
        }));
    }
    Parse::new(tokens)
}

/// Blank-line delimited lines of one sentence, with 1-based line numbers
#[derive(Default)]
struct Block<'a> {
    lines: Vec<(usize, &'a str)>,
}

fn blocks(input: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current = Block::default();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.lines.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.lines.push((idx + 1, line));
    }

    if !current.lines.is_empty() {
        blocks.push(current);
    }
    blocks
}

impl Block<'_> {
    fn start(&self) -> usize {
        self.lines.first().map_or(1, |(line_no, _)| *line_no)
    }

    fn read(&self) -> Result<Option<ConlluSentence>> {
        let mut words = Vec::new();
        let mut kept = String::new();

        for &(line_no, line) in &self.lines {
            if !line.starts_with('#') {
                let id = line.split('\t').next().unwrap_or_default();
                if id.contains('-') || id.contains('.') {
                    continue;
                }
                words.push((line_no, line));
            }
            kept.push_str(line);
            kept.push('\n');
        }

        if words.is_empty() {
            let has_text = self
                .lines
                .iter()
                .any(|(_, line)| line.trim_start_matches('#').trim_start().starts_with("text ="));
            if has_text {
                return Err(invalid(self.start(), "sentence has no tokens".to_string()));
            }
            return Ok(None);
        }

        // The dependency graph rejects out-of-range heads by panicking, so
        // they are caught here with their line number.
        check_words(&words)?;
        kept.push('\n');

        let sentence = Reader::new(kept.as_bytes())
            .read_sentence()
            .map_err(|e| invalid(self.start(), e.to_string()))?
            .ok_or_else(|| invalid(self.start(), "sentence has no tokens".to_string()))?;

        Ok(Some(convert(&sentence)))
    }
}

/// Token ids must run 1..=n and heads must stay inside the sentence
fn check_words(words: &[(usize, &str)]) -> Result<()> {
    let len = words.len();
    for (position, (line_no, line)) in words.iter().enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();

        if let Ok(id) = fields[0].parse::<usize>() {
            if id != position + 1 {
                return Err(invalid(
                    *line_no,
                    format!("expected token id {}, found {id}", position + 1),
                ));
            }
        }

        if let Some(Ok(head)) = fields.get(HEAD_COLUMN).map(|h| h.parse::<usize>()) {
            if head > len {
                return Err(invalid(
                    *line_no,
                    format!("head {head} outside sentence of {len} tokens"),
                ));
            }
        }
    }
    Ok(())
}

fn convert(sentence: &Sentence) -> ConlluSentence {
    let graph = sentence.dep_graph();
    let mut tokens = Vec::with_capacity(sentence.len().saturating_sub(1));
    let mut spacing = Vec::with_capacity(tokens.capacity());

    // Node 0 is the artificial root
    for (idx, node) in sentence.iter().enumerate().skip(1) {
        let Some(word) = node.token() else {
            continue;
        };

        let (head, deprel) = match graph.head(idx) {
            Some(triple) => (
                triple.head().checked_sub(1),
                triple.relation().unwrap_or("_").to_string(),
            ),
            None => (None, "_".to_string()),
        };

        spacing.push(!no_space_after(word));
        tokens.push(Token::new(
            word.form(),
            word.upos().unwrap_or("_"),
            deprel,
            head,
        ));
    }

    let text = sentence
        .comments()
        .iter()
        .find_map(|comment| match comment {
            Comment::AttrVal { attr, val } if attr == "text" => Some(val.trim().to_string()),
            _ => None,
        })
        .unwrap_or_else(|| rebuild_text(&tokens, &spacing));

    ConlluSentence { text, tokens }
}

fn no_space_after(word: &UdToken) -> bool {
    matches!(
        word.misc().get("SpaceAfter"),
        Some(Some(value)) if value == "No"
    )
}

fn rebuild_text(tokens: &[Token], spacing: &[bool]) -> String {
    let mut text = String::new();
    for (token, space) in tokens.iter().zip(spacing) {
        text.push_str(&token.text);
        if *space {
            text.push(' ');
        }
    }
    text.trim_end().to_string()
}

fn invalid(line: usize, message: String) -> TcdError {
    TcdError::InvalidAnnotation { line, message }
}
