//! Vectorizer types and constants.

use serde::{Deserialize, Serialize};

use polarity_types::VectorizerConfig;

use crate::analyzer::NgramExtractor;

/// Version written into every persisted [`VectorizerState`].
pub const FORMAT_VERSION: u32 = 1;

/// Fits TF-IDF vocabularies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TfidfVectorizer {
    pub(crate) config: VectorizerConfig,
}

impl TfidfVectorizer {
    /// Unfitted vectorizer with `config`.
    pub fn new(config: VectorizerConfig) -> Self {
        Self { config }
    }

    /// Settings used by the next fit.
    #[inline]
    pub fn config(&self) -> VectorizerConfig {
        self.config
    }
}

/// Frozen vocabulary and IDF weights.
///
/// Column `i` of every transformed row belongs to `terms[i]`. Terms are kept
/// in strictly ascending order so lookups are a binary search, and the same
/// vocabulary always maps to the same columns.
///
/// Equality compares weights bit for bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerState {
    pub(crate) version: u32,
    pub(crate) config: VectorizerConfig,
    pub(crate) n_documents: usize,
    pub(crate) terms: Vec<String>,
    pub(crate) idf: Vec<f64>,
}

impl VectorizerState {
    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.terms.len()
    }

    /// Documents the vocabulary was fitted on.
    #[inline]
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Settings the vocabulary was fitted with.
    #[inline]
    pub fn config(&self) -> VectorizerConfig {
        self.config
    }

    /// Vocabulary in column order.
    #[inline]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// IDF weight per column.
    #[inline]
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Column of `term`, if it is in the vocabulary.
    #[inline]
    pub fn column(&self, term: &str) -> Option<u32> {
        self.terms
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .map(|i| i as u32)
    }

    #[inline]
    pub(crate) fn extractor(&self) -> NgramExtractor {
        NgramExtractor::from_config(&self.config)
    }
}

impl PartialEq for VectorizerState {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.config == other.config
            && self.n_documents == other.n_documents
            && self.terms == other.terms
            && self.idf.len() == other.idf.len()
            && self
                .idf
                .iter()
                .zip(&other.idf)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}
