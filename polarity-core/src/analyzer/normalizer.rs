use std::borrow::Cow;

use memchr::memchr2;

use crate::analyzer::lemmatizer::VerbLemmatizer;
use crate::analyzer::stopwords::StopWords;
use crate::analyzer::tokenizer::Tokenizer;

/// Maps every byte to its lowercase ASCII letter, or to a space.
///
/// Digits, punctuation, control bytes and every byte of a multi-byte UTF-8
/// sequence become separators.
#[rustfmt::skip]
const FOLD_TABLE: [u8; 256] = {
    let mut table = [b' '; 256];
    let mut b = b'a';
    while b <= b'z' {
        table[b as usize] = b;
        table[(b - 32) as usize] = b;
        b += 1;
    }
    table
};

/// Configuration options for text normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Drop `<...>` spans before folding.
    pub strip_tags: bool,
    /// Drop English stopwords.
    pub remove_stopwords: bool,
    /// Reduce tokens to their verb base form.
    pub lemmatize: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            strip_tags: true,
            remove_stopwords: true,
            lemmatize: true,
        }
    }
}

/// Deterministic review text cleaner.
///
/// Performs, in order:
/// - Removes HTML-like `<...>` spans (a span never crosses a newline)
/// - Replaces every byte that is not an ASCII letter with a space
/// - Lowercases and collapses runs of spaces
/// - Drops stopwords, lemmatizes the rest as verbs, drops lemmas that are stopwords
///
/// Output is ASCII lowercase tokens joined by single spaces, with no leading or
/// trailing space. Normalizing twice gives the same result as normalizing once.
///
/// # Examples
///
/// ```
/// use polarity_core::analyzer::TextNormalizer;
///
/// let normalizer = TextNormalizer::default();
/// assert_eq!(normalizer.normalize("Great! <br/>Works well."), "great work well");
/// ```
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    config: NormalizerConfig,
    stopwords: StopWords,
    lemmatizer: VerbLemmatizer,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

impl TextNormalizer {
    /// Creates a new normalizer with the English stopword set.
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            stopwords: StopWords::english(),
            lemmatizer: VerbLemmatizer::new(),
        }
    }

    /// Returns the active configuration.
    #[inline]
    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    /// Strips tags and folds to lowercase letters separated by single spaces.
    ///
    /// Clears `out` before writing.
    pub fn fold_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.reserve(input.len());

        let bytes = input.as_bytes();
        let mut folded: Vec<u8> = std::mem::take(out).into_bytes();
        let mut prev_space = true;
        let mut i = 0usize;

        while i < bytes.len() {
            let b = bytes[i];

            if b == b'<' && self.config.strip_tags {
                if let Some(close) = tag_end(&bytes[i + 1..]) {
                    i += close + 2;
                    continue;
                }
            }

            let f = FOLD_TABLE[b as usize];
            if f == b' ' {
                if !prev_space {
                    folded.push(b' ');
                    prev_space = true;
                }
            } else {
                folded.push(f);
                prev_space = false;
            }
            i += 1;
        }

        if folded.last() == Some(&b' ') {
            folded.pop();
        }

        // Every pushed byte is ASCII.
        *out = String::from_utf8(folded).unwrap_or_default();
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Clears the buffer before writing.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        let mut folded = String::with_capacity(input.len());
        self.fold_into(input, &mut folded);

        out.clear();
        out.reserve(folded.len());

        Tokenizer::new().tokenize(&folded, |token, _| {
            if let Some(kept) = self.process_token(token) {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&kept);
            }
        });
    }

    /// Normalizes text and returns a new String.
    #[inline]
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }

    /// Normalizes an optional field. `None` yields an empty string.
    #[inline]
    pub fn normalize_opt(&self, input: Option<&str>) -> String {
        input.map(|s| self.normalize(s)).unwrap_or_default()
    }

    fn process_token<'t>(&self, token: &'t str) -> Option<Cow<'t, str>> {
        let remove = self.config.remove_stopwords;

        if remove && self.stopwords.contains(token) {
            return None;
        }

        let lemma = if self.config.lemmatize {
            self.lemmatizer.lemmatize(token)
        } else {
            Cow::Borrowed(token)
        };

        if remove && self.stopwords.contains(&lemma) {
            return None;
        }

        Some(lemma)
    }
}

/// Offset of the `>` closing a tag opened just before `rest`, unless a newline comes first.
#[inline]
fn tag_end(rest: &[u8]) -> Option<usize> {
    match memchr2(b'>', b'\n', rest) {
        Some(pos) if rest[pos] == b'>' => Some(pos),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(input: &str) -> String {
        TextNormalizer::default().normalize(input)
    }

    fn fold(input: &str) -> String {
        let mut out = String::new();
        TextNormalizer::default().fold_into(input, &mut out);
        out
    }

    #[test]
    fn review_scenario() {
        assert_eq!(norm("great works well"), "great work well");
    }

    #[test]
    fn fold_full_alphabet() {
        let upper: String = (b'A'..=b'Z').map(|b| b as char).collect();
        let lower: String = (b'a'..=b'z').map(|b| b as char).collect();
        assert_eq!(fold(&upper), lower);
    }

    #[test]
    fn fold_replaces_non_letters() {
        assert_eq!(fold("foo-bar_baz"), "foo bar baz");
        assert_eq!(fold("123 ABC!"), "abc");
        assert_eq!(fold("don't"), "don t");
    }

    #[test]
    fn fold_collapses_and_trims() {
        assert_eq!(fold("   hello   world  "), "hello world");
        assert_eq!(fold("hello\t\nworld"), "hello world");
        assert_eq!(fold("\n\t\r"), "");
    }

    #[test]
    fn fold_drops_unicode() {
        assert_eq!(fold("café"), "caf");
        assert_eq!(fold("Hello 🌍 World"), "hello world");
        assert_eq!(fold("你好世界"), "");
    }

    #[test]
    fn tags_removed_without_separator() {
        assert_eq!(fold("great<br />product"), "greatproduct");
        assert_eq!(fold("<p>Nice</p> taste"), "nice taste");
    }

    #[test]
    fn tag_is_non_greedy() {
        assert_eq!(fold("<a>keep<b>"), "keep");
    }

    #[test]
    fn unclosed_tag_is_separator() {
        assert_eq!(fold("a < b"), "a b");
        assert_eq!(fold("tasty <no close"), "tasty no close");
    }

    #[test]
    fn tag_does_not_cross_newline() {
        assert_eq!(fold("x <y\nz> w"), "x y z w");
    }

    #[test]
    fn tag_strip_can_be_disabled() {
        let n = TextNormalizer::new(NormalizerConfig {
            strip_tags: false,
            ..Default::default()
        });
        let mut out = String::new();
        n.fold_into("a<b>c", &mut out);
        assert_eq!(out, "a b c");
    }

    #[test]
    fn stopwords_removed() {
        assert_eq!(norm("this is the best tea"), "best tea");
        assert_eq!(norm("The"), "");
    }

    #[test]
    fn lemmatizes_verbs() {
        assert_eq!(norm("Running and jumped"), "run jump");
        assert_eq!(norm("She studies daily"), "study daily");
    }

    #[test]
    fn lemma_that_is_stopword_dropped() {
        assert_eq!(norm("doing great"), "great");
    }

    #[test]
    fn empty_and_none() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize_opt(None), "");
        assert_eq!(n.normalize_opt(Some("Tasty")), "tasty");
    }

    #[test]
    fn order_preserved() {
        assert_eq!(norm("zebra apple mango"), "zebra apple mango");
    }

    #[test]
    fn no_double_or_edge_spaces() {
        let out = norm("  hello!!   world ...  ");
        assert!(!out.contains("  "));
        assert!(!out.starts_with(' '));
        assert!(!out.ends_with(' '));
    }

    #[test]
    fn normalize_into_reuses_buffer() {
        let n = TextNormalizer::default();
        let mut buf = String::with_capacity(64);
        n.normalize_into("LOVELY", &mut buf);
        assert_eq!(buf, "lovely");
        n.normalize_into("bitter", &mut buf);
        assert_eq!(buf, "bitter");
    }

    #[test]
    fn idempotent_samples() {
        let n = TextNormalizer::default();
        let samples = [
            "I've been using it <b>daily</b> and LOVE it!!!",
            "Broke after 2 days... doing nothing useful",
            "studies tried hoped stopped making",
            "",
        ];

        for s in samples {
            let once = n.normalize(s);
            let twice = n.normalize(&once);
            assert_eq!(once, twice, "input {s:?}");
        }
    }

    proptest! {
        #[test]
        fn idempotent_for_any_string(s in any::<String>()) {
            let n = TextNormalizer::default();
            let once = n.normalize(&s);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn idempotent_for_wordy_strings(s in "[a-zA-Z <>/.,!']{0,80}") {
            let n = TextNormalizer::default();
            let once = n.normalize(&s);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn output_is_lowercase_ascii(s in any::<String>()) {
            let out = TextNormalizer::default().normalize(&s);
            prop_assert!(out.bytes().all(|b| b == b' ' || b.is_ascii_lowercase()));
        }
    }
}
