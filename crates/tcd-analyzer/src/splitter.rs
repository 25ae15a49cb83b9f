//! Sentence splitter
//!
//! Splits raw input on the literal period character. Abbreviations,
//! decimals, ellipses, `!` and `?` are not treated specially.
//!
//! Author: hephaex@gmail.com

/// Fragment separator
pub const SEPARATOR: char = '.';

/// Split text into trimmed, non-empty fragments
pub fn split_fragments(text: &str) -> Vec<String> {
    text.split(SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
