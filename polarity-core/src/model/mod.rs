//! Classifier seam.
//!
//! The predictor only needs a positive-class probability, or a hard label
//! when a model has no probabilities. [`Classifier`] is that contract;
//! [`Trainer`] builds a classifier from a feature matrix. One concrete pair
//! ships with the crate: [`LogisticRegression`] trains a [`LogisticModel`].

pub mod logistic;

pub use logistic::{LogisticModel, LogisticRegression};

use polarity_types::{FeatureMatrix, Label, Result, SparseVector};

/// Raw classifier output for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Probability of the positive class, in `[0, 1]`.
    Probability(f64),
    /// Label from a model that exposes no probability.
    Hard(Label),
}

impl Decision {
    /// Positive-class probability. Hard labels map to `1.0` or `0.0`.
    #[inline]
    pub fn positive_probability(self) -> f64 {
        match self {
            Decision::Probability(p) => p,
            Decision::Hard(label) => label.target(),
        }
    }
}

/// A trained binary classifier over sparse rows.
///
/// Implementations are immutable after training or loading and may be shared
/// across threads.
pub trait Classifier: Send + Sync {
    /// Number of feature columns the model was trained on.
    fn n_features(&self) -> usize;

    /// Scores one row.
    ///
    /// # Errors
    ///
    /// Returns [`polarity_types::PolarityError::FeatureMismatch`] if the row
    /// has a column outside the model's width.
    fn decide(&self, row: &SparseVector) -> Result<Decision>;
}

/// Builds a classifier from labeled rows.
pub trait Trainer {
    /// Classifier produced by [`fit`](Self::fit).
    type Model: Classifier;

    /// Fits a model. `labels[i]` belongs to row `i`.
    fn fit(&self, features: &FeatureMatrix, labels: &[Label]) -> Result<Self::Model>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn decide(&self, row: &SparseVector) -> Result<Decision> {
        (**self).decide(row)
    }
}
