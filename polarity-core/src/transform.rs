//! Training-time and inference-time transforms.
//!
//! [`TrainingTransform`] is the only code path that fits a vectorizer. It
//! labels, balances and cleans a batch of reviews and returns the frozen
//! [`VectorizerState`] alongside the features. [`InferenceTransform`] holds a
//! frozen state and turns new text into rows, one text at a time.

use std::sync::Arc;

use tracing::debug;

use polarity_types::{
    BalanceConfig, FeatureMatrix, Label, Result, Review, SparseVector, VectorizerConfig,
};

use crate::analyzer::TextNormalizer;
use crate::dataset::{derive_and_balance, BalancedDataset};
use crate::vectorizer::{TfidfVectorizer, VectorizerState};

/// Texts with their feature rows, in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformedBatch {
    /// Caller-facing text of each row, not normalized.
    pub texts: Vec<String>,
    pub features: FeatureMatrix,
}

impl TransformedBatch {
    #[inline]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Turns fetched reviews into feature rows for prediction.
pub trait Transformer {
    /// Transforms every review or fails as a whole.
    fn transform(&self, reviews: &[Review]) -> Result<TransformedBatch>;
}

/// Output of the training transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    pub dataset: BalancedDataset,
    /// One row per dataset example, in dataset order.
    pub features: FeatureMatrix,
    pub labels: Vec<Label>,
    /// The frozen state inference must reuse.
    pub state: VectorizerState,
}

/// Label, balance, clean and fit.
#[derive(Debug, Clone, Default)]
pub struct TrainingTransform {
    normalizer: TextNormalizer,
    vectorizer: TfidfVectorizer,
    balance: BalanceConfig,
}

impl TrainingTransform {
    pub fn new(vectorizer: VectorizerConfig, balance: BalanceConfig) -> Self {
        Self {
            normalizer: TextNormalizer::default(),
            vectorizer: TfidfVectorizer::new(vectorizer),
            balance,
        }
    }

    /// Replaces the default normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[inline]
    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Builds the training features and the frozen vectorizer.
    ///
    /// # Errors
    ///
    /// Returns [`polarity_types::PolarityError::EmptyClass`] if either class
    /// has no reviews.
    pub fn fit(&self, reviews: &[Review]) -> Result<TrainingSet> {
        let dataset = derive_and_balance(reviews, &self.normalizer, self.balance.seed)?;
        let (features, state) = self.vectorizer.fit_transform(&dataset.texts());
        let labels = dataset.labels();

        debug!(
            rows = features.n_rows(),
            columns = features.n_features(),
            "built training features"
        );

        Ok(TrainingSet {
            dataset,
            features,
            labels,
            state,
        })
    }
}

/// Cleans text and vectorizes it against a frozen vocabulary.
///
/// Cloning is cheap; clones share the vectorizer state.
#[derive(Debug, Clone)]
pub struct InferenceTransform {
    normalizer: TextNormalizer,
    state: Arc<VectorizerState>,
}

impl InferenceTransform {
    pub fn new(state: VectorizerState) -> Self {
        Self::shared(Arc::new(state))
    }

    /// Wraps an already shared state.
    pub fn shared(state: Arc<VectorizerState>) -> Self {
        Self {
            normalizer: TextNormalizer::default(),
            state,
        }
    }

    /// Replaces the default normalizer. It must match the one used in training.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[inline]
    pub fn state(&self) -> &VectorizerState {
        &self.state
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.state.n_features()
    }

    /// Feature row for one raw text.
    ///
    /// # Errors
    ///
    /// Returns [`polarity_types::PolarityError::CorruptWeight`] if the text
    /// hits an unusable vectorizer weight.
    pub fn transform_text(&self, text: &str) -> Result<SparseVector> {
        let cleaned = self.normalizer.normalize(text);
        self.state.transform_one(&cleaned)
    }

    /// Feature rows for raw texts, failing on the first bad row.
    pub fn transform_texts<S: AsRef<str>>(&self, texts: &[S]) -> Result<FeatureMatrix> {
        let rows = texts
            .iter()
            .map(|t| self.transform_text(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(FeatureMatrix::from_rows(self.n_features(), rows))
    }
}

impl Transformer for InferenceTransform {
    fn transform(&self, reviews: &[Review]) -> Result<TransformedBatch> {
        let texts: Vec<String> = reviews.iter().map(Review::combined_text).collect();
        let features = self.transform_texts(&texts)?;
        Ok(TransformedBatch { texts, features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polarity_types::PolarityError;

    fn reviews() -> Vec<Review> {
        vec![
            Review::new("1", "p", "u", 5, "works well").with_summary("great"),
            Review::new("2", "p", "u", 4, "tasty and fresh"),
            Review::new("3", "p", "u", 1, "stale and bitter"),
            Review::new("4", "p", "u", 2, "arrived broken"),
            Review::new("5", "p", "u", 3, "it is fine"),
        ]
    }

    #[test]
    fn training_set_is_consistent() {
        let set = TrainingTransform::default().fit(&reviews()).unwrap();
        assert_eq!(set.dataset.len(), 4);
        assert_eq!(set.features.n_rows(), 4);
        assert_eq!(set.labels, set.dataset.labels());
        assert_eq!(set.features.n_features(), set.state.n_features());
    }

    #[test]
    fn training_requires_both_classes() {
        let only_positive: Vec<Review> = reviews().into_iter().filter(|r| r.score >= 4).collect();
        let err = TrainingTransform::default().fit(&only_positive).unwrap_err();
        assert!(matches!(err, PolarityError::EmptyClass { negatives: 0, .. }));
    }

    #[test]
    fn inference_reuses_frozen_state() {
        let set = TrainingTransform::default().fit(&reviews()).unwrap();
        let transform = InferenceTransform::new(set.state.clone());

        let row = transform.transform_text("Great! It WORKS well.").unwrap();
        assert!(!row.is_zero());
        assert_eq!(transform.state(), &set.state);
        assert_eq!(transform.n_features(), set.state.n_features());
    }

    #[test]
    fn inference_matches_training_rows() {
        let set = TrainingTransform::default().fit(&reviews()).unwrap();
        let transform = InferenceTransform::new(set.state.clone());

        for (example, row) in set.dataset.examples().iter().zip(set.features.rows()) {
            assert_eq!(&transform.state().transform_one(&example.text).unwrap(), row);
        }
    }

    #[test]
    fn unknown_words_give_zero_row() {
        let set = TrainingTransform::default().fit(&reviews()).unwrap();
        let transform = InferenceTransform::new(set.state);
        assert!(transform.transform_text("zzqx blorple").unwrap().is_zero());
    }

    #[test]
    fn transformer_keeps_original_text() {
        let set = TrainingTransform::default().fit(&reviews()).unwrap();
        let transform = InferenceTransform::new(set.state);
        let batch = transform
            .transform(&[Review::new("9", "p", "u", 5, "Works WELL").with_summary("Great")])
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.texts[0], "Great Works WELL");
        assert_eq!(batch.features.n_rows(), 1);
    }
}
