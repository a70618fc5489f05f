//! Training data preparation.
//!
//! Turns raw reviews into a class-balanced set of cleaned, labeled examples
//! and splits it into train and held-out parts.

pub mod balance;
pub mod split;

pub use balance::{derive_and_balance, LabelCounts};
pub use split::{stratified_split, Split};

use polarity_types::Label;

/// Cleaned review text with its binary label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    /// Identifier of the review the example came from.
    pub source_id: String,
    /// Normalized summary and body.
    pub text: String,
    pub label: Label,
}

/// Labeled examples with equal class counts, in shuffled order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalancedDataset {
    examples: Vec<LabeledExample>,
    per_class: usize,
}

impl BalancedDataset {
    pub(crate) fn new(examples: Vec<LabeledExample>, per_class: usize) -> Self {
        debug_assert_eq!(examples.len(), per_class * 2);
        Self {
            examples,
            per_class,
        }
    }

    /// Examples in each class.
    #[inline]
    pub fn per_class(&self) -> usize {
        self.per_class
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    #[inline]
    pub fn examples(&self) -> &[LabeledExample] {
        &self.examples
    }

    /// Number of examples carrying `label`.
    pub fn count(&self, label: Label) -> usize {
        self.examples.iter().filter(|e| e.label == label).count()
    }

    /// Cleaned texts, in dataset order.
    pub fn texts(&self) -> Vec<&str> {
        self.examples.iter().map(|e| e.text.as_str()).collect()
    }

    /// Labels, in dataset order.
    pub fn labels(&self) -> Vec<Label> {
        self.examples.iter().map(|e| e.label).collect()
    }
}
