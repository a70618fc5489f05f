//! English stopword set.
//!
//! The word list is the common NLTK English list restricted to entries made
//! of letters only. Contractions never survive normalization intact
//! (`don't` folds to `don t`), so their fragments are listed instead.

use rustc_hash::FxHashSet;

/// English stopwords, lowercase.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Hash set of stopwords for constant-time membership checks.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: FxHashSet<&'static str>,
}

impl StopWords {
    /// The English stopword set.
    pub fn english() -> Self {
        Self::from_words(ENGLISH_STOP_WORDS)
    }

    /// Builds a set from static lowercase words.
    pub fn from_words(words: &[&'static str]) -> Self {
        Self {
            words: words.iter().copied().collect(),
        }
    }

    /// Membership check. Input must already be lowercase.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_words_present() {
        let sw = StopWords::english();
        for w in ["the", "and", "is", "not", "don", "t", "doing"] {
            assert!(sw.contains(w), "{w} should be a stopword");
        }
    }

    #[test]
    fn content_words_absent() {
        let sw = StopWords::english();
        for w in ["great", "terrible", "coffee", "work", "well"] {
            assert!(!sw.contains(w), "{w} should not be a stopword");
        }
    }

    #[test]
    fn entries_are_lowercase_letters() {
        for w in ENGLISH_STOP_WORDS {
            assert!(w.bytes().all(|b| b.is_ascii_lowercase()), "{w}");
        }
    }

    #[test]
    fn no_duplicates() {
        assert_eq!(StopWords::english().len(), ENGLISH_STOP_WORDS.len());
    }
}
