//! Text tokenization
//!
//! The classifier only ever sees text through a [`Tokenizer`]. The default
//! implementation strips everything but ASCII word characters, lowercases and splits at
//! white-space. Any `Fn(&str) -> Vec<String>` closure can be plugged in
//! instead.

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("static pattern compiles"));

/// Maps raw text to an ordered sequence of tokens
pub trait Tokenizer: Send + Sync {
    /// Split text into tokens. Repeats are kept, order is preserved.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Default tokenizer
///
/// Replaces every run of characters outside `[A-Za-z0-9_]` with a single
/// space, converts to lowercase and splits at white-space, dropping empty
/// tokens. Non-ASCII letters are separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl Tokenizer for DefaultTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        NON_WORD
            .replace_all(text, " ")
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}
