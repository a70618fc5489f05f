//! Word n-gram extraction.
//!
//! Produces the vocabulary terms of a document: every run of `n` consecutive
//! tokens for each `n` in the configured range, joined by single spaces.

use smallvec::SmallVec;

use polarity_types::VectorizerConfig;

use crate::analyzer::tokenizer::Tokenizer;

/// Token buffer sized for a typical review.
type TokenBuf<'a> = SmallVec<[&'a str; 64]>;

/// Sliding-window word n-gram extractor.
///
/// Tokens shorter than `min_token_len` characters are dropped before the
/// window is applied, so they never appear inside an n-gram either.
///
/// # Example
///
/// ```
/// use polarity_core::analyzer::NgramExtractor;
///
/// let mut terms = Vec::new();
/// NgramExtractor::new(1, 2, 2).extract("great work well", |t| terms.push(t.to_owned()));
///
/// assert_eq!(terms, ["great", "work", "well", "great work", "work well"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramExtractor {
    min_n: usize,
    max_n: usize,
    min_token_len: usize,
}

impl NgramExtractor {
    /// Creates an extractor for n-grams with `min_n <= n <= max_n`.
    ///
    /// `min_n` is clamped to at least 1 and `max_n` to at least `min_n`.
    pub fn new(min_n: usize, max_n: usize, min_token_len: usize) -> Self {
        let min_n = min_n.max(1);
        Self {
            min_n,
            max_n: max_n.max(min_n),
            min_token_len,
        }
    }

    pub fn from_config(config: &VectorizerConfig) -> Self {
        let (lo, hi) = config.ngram_range;
        Self::new(lo, hi, config.min_token_len)
    }

    /// Extracts n-grams, shortest first, each group left to right.
    ///
    /// The `&str` passed to the callback is only valid for the duration of
    /// the call.
    pub fn extract<F>(&self, text: &str, mut callback: F)
    where
        F: FnMut(&str),
    {
        let mut tokens = TokenBuf::new();
        Tokenizer::new().tokenize_lenient(text, |token, _| {
            if token.chars().count() >= self.min_token_len {
                tokens.push(token);
            }
        });

        let mut joined = String::new();
        for n in self.min_n..=self.max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                if n == 1 {
                    callback(window[0]);
                    continue;
                }
                joined.clear();
                for (i, token) in window.iter().enumerate() {
                    if i > 0 {
                        joined.push(' ');
                    }
                    joined.push_str(token);
                }
                callback(&joined);
            }
        }
    }
}

impl Default for NgramExtractor {
    fn default() -> Self {
        Self::from_config(&VectorizerConfig::default())
    }
}
