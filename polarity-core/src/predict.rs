//! Threshold predictor.
//!
//! Turns a classifier's positive-class probability into a label and a
//! confidence in that label. The threshold is fixed at
//! [`POSITIVE_THRESHOLD`], so confidence is always in `[0.5, 1.0]` and
//! `p == 0.5` resolves to positive.

use std::sync::Arc;

use polarity_types::{
    FeatureMatrix, PolarityError, Result, SentimentLabel, SparseVector, Verdict,
    POSITIVE_THRESHOLD,
};

use crate::model::{Classifier, Decision};

/// Label and confidence for a positive-class probability `p` in `[0, 1]`.
///
/// ```
/// use polarity_core::predict::verdict_for;
/// use polarity_types::SentimentLabel;
///
/// let v = verdict_for(0.2);
/// assert_eq!(v.label, SentimentLabel::Negative);
/// assert!((v.confidence - 0.8).abs() < 1e-12);
/// ```
#[inline]
pub fn verdict_for(p: f64) -> Verdict {
    if p >= POSITIVE_THRESHOLD {
        Verdict {
            label: SentimentLabel::Positive,
            confidence: p,
        }
    } else {
        Verdict {
            label: SentimentLabel::Negative,
            confidence: 1.0 - p,
        }
    }
}

/// Scores feature rows.
pub trait Predictor: Send + Sync {
    /// Verdict for one row.
    fn predict(&self, row: &SparseVector) -> Result<Verdict>;

    /// Verdicts for every row, equal to calling [`predict`](Self::predict) on each.
    ///
    /// Fails on the first row that fails.
    fn predict_matrix(&self, features: &FeatureMatrix) -> Result<Vec<Verdict>> {
        features.rows().iter().map(|row| self.predict(row)).collect()
    }
}

/// A classifier behind the fixed 0.5 threshold.
#[derive(Debug)]
pub struct ThresholdPredictor<C> {
    classifier: Arc<C>,
}

impl<C> Clone for ThresholdPredictor<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl<C: Classifier> ThresholdPredictor<C> {
    /// Takes ownership of `classifier`.
    pub fn new(classifier: C) -> Self {
        Self::shared(Arc::new(classifier))
    }

    /// Wraps an already shared classifier.
    pub fn shared(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    #[inline]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }
}

impl<C: Classifier> Predictor for ThresholdPredictor<C> {
    /// # Errors
    ///
    /// Whatever the classifier reports, or
    /// [`PolarityError::InvalidProbability`] for a NaN or infinite probability.
    fn predict(&self, row: &SparseVector) -> Result<Verdict> {
        let p = match self.classifier.decide(row)? {
            Decision::Probability(p) if !p.is_finite() => {
                return Err(PolarityError::InvalidProbability(p))
            }
            Decision::Probability(p) => p.clamp(0.0, 1.0),
            hard @ Decision::Hard(_) => hard.positive_probability(),
        };
        Ok(verdict_for(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polarity_types::Label;

    /// Returns a fixed decision for every row.
    struct Fixed(Decision);

    impl Classifier for Fixed {
        fn n_features(&self) -> usize {
            4
        }

        fn decide(&self, _row: &SparseVector) -> Result<Decision> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Classifier for Failing {
        fn n_features(&self) -> usize {
            1
        }

        fn decide(&self, _row: &SparseVector) -> Result<Decision> {
            Err(PolarityError::FeatureMismatch {
                expected: 1,
                actual: 2,
            })
        }
    }

    fn predict(decision: Decision) -> Verdict {
        ThresholdPredictor::new(Fixed(decision))
            .predict(&SparseVector::default())
            .unwrap()
    }

    #[test]
    fn boundary_is_positive() {
        let v = predict(Decision::Probability(0.5));
        assert_eq!(v.label, SentimentLabel::Positive);
        assert_eq!(v.confidence, 0.5);
    }

    #[test]
    fn positive_confidence_is_p() {
        let v = predict(Decision::Probability(0.73));
        assert_eq!(v.label, SentimentLabel::Positive);
        assert_eq!(v.confidence, 0.73);
    }

    #[test]
    fn negative_confidence_is_complement() {
        let v = predict(Decision::Probability(0.2));
        assert_eq!(v.label, SentimentLabel::Negative);
        assert!((v.confidence - 0.8).abs() < 1e-12);
    }

    #[test]
    fn hard_decisions() {
        let pos = predict(Decision::Hard(Label::Positive));
        assert_eq!(pos.label, SentimentLabel::Positive);
        assert_eq!(pos.confidence, 1.0);

        let neg = predict(Decision::Hard(Label::Negative));
        assert_eq!(neg.label, SentimentLabel::Negative);
        assert_eq!(neg.confidence, 1.0);
    }

    #[test]
    fn confidence_never_below_half() {
        for i in 0..=100 {
            let v = verdict_for(i as f64 / 100.0);
            assert!((0.5..=1.0).contains(&v.confidence), "p = {i}%");
        }
    }

    #[test]
    fn threshold_is_half() {
        assert_eq!(POSITIVE_THRESHOLD, 0.5);
        assert_eq!(verdict_for(0.499).label, SentimentLabel::Negative);
        assert_eq!(verdict_for(0.6).label, SentimentLabel::Positive);
        assert_eq!(verdict_for(0.6).confidence, 0.6);
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let high = predict(Decision::Probability(1.5));
        assert_eq!(high.label, SentimentLabel::Positive);
        assert_eq!(high.confidence, 1.0);

        let low = predict(Decision::Probability(-0.5));
        assert_eq!(low.label, SentimentLabel::Negative);
        assert_eq!(low.confidence, 1.0);
    }

    #[test]
    fn non_finite_probability_is_an_error() {
        for p in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = ThresholdPredictor::new(Fixed(Decision::Probability(p)))
                .predict(&SparseVector::default());
            assert!(
                matches!(result, Err(PolarityError::InvalidProbability(_))),
                "p = {p}: {result:?}"
            );
        }
    }

    #[test]
    fn matrix_matches_single_calls() {
        let predictor = ThresholdPredictor::new(Fixed(Decision::Probability(0.9)));
        let m = FeatureMatrix::from_rows(
            4,
            vec![SparseVector::default(), SparseVector::from_pairs(vec![(1, 1.0)])],
        );
        let batch = predictor.predict_matrix(&m).unwrap();
        let single: Vec<_> = m.rows().iter().map(|r| predictor.predict(r).unwrap()).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn classifier_errors_propagate() {
        let predictor = ThresholdPredictor::new(Failing);
        assert!(predictor.predict(&SparseVector::default()).is_err());
    }

    #[test]
    fn clones_share_the_classifier() {
        let a = ThresholdPredictor::new(Fixed(Decision::Probability(0.6)));
        let b = a.clone();
        assert!(std::ptr::eq(a.classifier(), b.classifier()));
    }
}
