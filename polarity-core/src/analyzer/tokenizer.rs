//! Streaming tokenizer.
//!
//! Splits cleaned review text into tokens without allocating. Tokens are
//! slices of the input and are emitted through a callback together with
//! their position:
//!
//! ```ignore
//! ("great", 0)
//! ("work", 1)
//! ("well", 2)
//! ```
//!
//! ## The Input Contract
//!
//! [`Tokenizer::tokenize`] expects text produced by
//! [`TextNormalizer`](crate::analyzer::TextNormalizer):
//! - No leading or trailing whitespace
//! - No consecutive spaces between words
//!
//! Debug builds assert the contract. [`Tokenizer::tokenize_lenient`] accepts
//! any text and splits on runs of ASCII whitespace.

use core::str;
use memchr::{memchr3_iter, memchr_iter};

/// Streaming tokenizer over single-space separated text.
///
/// ```
/// use polarity_core::analyzer::Tokenizer;
///
/// let mut tokens = Vec::new();
/// Tokenizer::new().tokenize("great work well", |text, pos| tokens.push((text, pos)));
///
/// assert_eq!(tokens, vec![("great", 0), ("work", 1), ("well", 2)]);
/// ```
#[derive(Debug, Copy, Clone, Default)]
pub struct Tokenizer {
    _private: (),
}

impl Tokenizer {
    /// Creates a new tokenizer.
    #[inline]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Tokenizes normalized input and emits `(text, position)`.
    ///
    /// After emitting a token at position `u32::MAX`, further emissions stop.
    #[inline(always)]
    #[allow(clippy::needless_lifetimes)]
    pub fn tokenize<'n, F>(&self, normalized: &'n str, emit: F)
    where
        F: FnMut(&'n str, u32),
    {
        let bytes = normalized.as_bytes();

        debug_assert!(
            bytes.first().is_none_or(|&b| b != b' '),
            "tokenizer: leading whitespace, normalizer contract violated"
        );

        debug_assert!(
            bytes.last().is_none_or(|&b| b != b' '),
            "tokenizer: trailing whitespace, normalizer contract violated"
        );

        debug_assert!(
            !bytes.windows(2).any(|w| w == b"  "),
            "tokenizer: consecutive spaces, normalizer contract violated"
        );

        split_on(normalized, memchr_iter(b' ', bytes), emit);
    }

    /// Tokenizes arbitrary text, splitting on runs of space, tab and newline.
    #[inline]
    #[allow(clippy::needless_lifetimes)]
    pub fn tokenize_lenient<'n, F>(&self, text: &'n str, emit: F)
    where
        F: FnMut(&'n str, u32),
    {
        let bytes = text.as_bytes();
        split_on(text, memchr3_iter(b' ', b'\t', b'\n', bytes), emit);
    }
}

#[inline(always)]
fn split_on<'n, I, F>(text: &'n str, separators: I, mut emit: F)
where
    I: Iterator<Item = usize>,
    F: FnMut(&'n str, u32),
{
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return;
    }

    let mut start = 0usize;
    let mut pos = 0u32;

    for i in separators {
        if start < i {
            // SAFETY: `text` is valid UTF-8. Separators are ASCII bytes, which are
            // never continuation bytes, so `bytes[start..i]` is a valid UTF-8 subslice.
            let token = unsafe { str::from_utf8_unchecked(&bytes[start..i]) };
            emit(token, pos);
            if pos == u32::MAX {
                return;
            }
            pos += 1;
        }
        start = i + 1;
    }

    if start < bytes.len() {
        // SAFETY: same invariants as above, `start` follows an ASCII separator.
        let token = unsafe { str::from_utf8_unchecked(&bytes[start..]) };
        emit(token, pos);
    }
}
