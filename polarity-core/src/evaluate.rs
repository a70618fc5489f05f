//! Classification metrics and batch summaries.

use core::fmt;

use polarity_types::{Label, SentimentLabel, SentimentResult};

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// True examples of the class.
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

/// Accuracy with per-class metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub negative: ClassMetrics,
    pub positive: ClassMetrics,
}

impl ClassificationReport {
    /// Compares predictions against the truth, pairwise.
    ///
    /// Extra entries in the longer slice are ignored. Undefined ratios are 0.
    pub fn from_predictions(truth: &[Label], predicted: &[Label]) -> Self {
        // [truth][prediction]
        let mut confusion = [[0usize; 2]; 2];
        for (t, p) in truth.iter().zip(predicted) {
            confusion[t.as_u8() as usize][p.as_u8() as usize] += 1;
        }

        let total: usize = confusion.iter().flatten().sum();
        let correct = confusion[0][0] + confusion[1][1];
        let class = |c: usize| {
            let other = 1 - c;
            ClassMetrics::from_counts(confusion[c][c], confusion[other][c], confusion[c][other])
        };

        Self {
            accuracy: if total == 0 {
                0.0
            } else {
                correct as f64 / total as f64
            },
            negative: class(Label::Negative.as_u8() as usize),
            positive: class(Label::Positive.as_u8() as usize),
        }
    }

    /// Examples scored.
    #[inline]
    pub fn support(&self) -> usize {
        self.negative.support + self.positive.support
    }

    /// Unweighted mean F1 over both classes.
    pub fn macro_f1(&self) -> f64 {
        (self.negative.f1 + self.positive.f1) / 2.0
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, m) in [("negative", &self.negative), ("positive", &self.positive)] {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        write!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.support()
        )
    }
}

/// Counts over a batch of results. Error results only count toward `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub valid: usize,
    pub positive: usize,
    pub negative: usize,
    /// Share of valid results that are positive.
    pub positive_ratio: f64,
    /// Mean confidence of valid results.
    pub mean_confidence: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[SentimentResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        let mut confidence = 0.0;

        for r in results {
            match r.label {
                SentimentLabel::Positive => summary.positive += 1,
                SentimentLabel::Negative => summary.negative += 1,
                SentimentLabel::Error => continue,
            }
            confidence += r.confidence;
        }

        summary.valid = summary.positive + summary.negative;
        if summary.valid > 0 {
            summary.positive_ratio = summary.positive as f64 / summary.valid as f64;
            summary.mean_confidence = confidence / summary.valid as f64;
        }
        summary
    }

    #[inline]
    pub fn errors(&self) -> usize {
        self.total - self.valid
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} texts: {} positive, {} negative, {} errors ({:.1}% positive, mean confidence {:.1}%)",
            self.total,
            self.positive,
            self.negative,
            self.errors(),
            self.positive_ratio * 100.0,
            self.mean_confidence * 100.0
        )
    }
}
