//! Core types, configuration and errors for the Polarity sentiment pipeline.
//!
//! This crate provides the value types that are shared between the training
//! path and the inference path. Keeping them separate ensures:
//!
//! - **One record shape**: ingestion, training and inference agree on `Review`
//! - **One error taxonomy**: every stage reports failures through [`PolarityError`]
//! - **Clean boundaries**: the core crate depends on types, never the reverse

#![warn(missing_docs)]

use core::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result alias used across the workspace.
pub type Result<T> = core::result::Result<T, PolarityError>;

/// Normalized product review record.
///
/// Optional fields stay `None` when the source lacks them. Downstream stages
/// read them as empty strings, never as fabricated values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Record identifier.
    pub id: String,
    /// Product identifier.
    pub product_id: String,
    /// Author identifier.
    pub user_id: String,
    /// Author display name.
    pub profile_name: Option<String>,
    /// Number of readers who found the review helpful.
    pub helpfulness_numerator: Option<u32>,
    /// Number of readers who rated the review's helpfulness.
    pub helpfulness_denominator: Option<u32>,
    /// Star rating in `1..=5`.
    pub score: u8,
    /// Unix timestamp of the review.
    pub time: Option<i64>,
    /// Short summary line.
    pub summary: Option<String>,
    /// Full review body.
    pub text: String,
}

impl Review {
    /// Lowest accepted rating.
    pub const MIN_SCORE: u8 = 1;
    /// Highest accepted rating.
    pub const MAX_SCORE: u8 = 5;

    /// Creates a review with only the required fields set.
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        user_id: impl Into<String>,
        score: u8,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            user_id: user_id.into(),
            profile_name: None,
            helpfulness_numerator: None,
            helpfulness_denominator: None,
            score,
            time: None,
            summary: None,
            text: text.into(),
        }
    }

    /// Sets the summary line.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the helpfulness counters.
    #[must_use]
    pub fn with_helpfulness(mut self, numerator: u32, denominator: u32) -> Self {
        self.helpfulness_numerator = Some(numerator);
        self.helpfulness_denominator = Some(denominator);
        self
    }

    /// Checks the record invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PolarityError::InvalidRecord`] if the score is outside `1..=5`
    /// or the helpfulness numerator exceeds its denominator.
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_SCORE..=Self::MAX_SCORE).contains(&self.score) {
            return Err(PolarityError::InvalidRecord {
                id: self.id.clone(),
                reason: format!("score {} outside 1..=5", self.score),
            });
        }

        if let (Some(num), Some(den)) = (self.helpfulness_numerator, self.helpfulness_denominator)
        {
            if num > den {
                return Err(PolarityError::InvalidRecord {
                    id: self.id.clone(),
                    reason: format!("helpfulness {num} exceeds denominator {den}"),
                });
            }
        }

        Ok(())
    }

    /// Summary and body joined by a single space.
    ///
    /// A missing summary contributes an empty string.
    pub fn combined_text(&self) -> String {
        let summary = self.summary.as_deref().unwrap_or("");
        let mut out = String::with_capacity(summary.len() + 1 + self.text.len());
        out.push_str(summary);
        out.push(' ');
        out.push_str(&self.text);
        out
    }

    /// Binary label derived from the score, `None` for neutral reviews.
    #[inline]
    pub fn label(&self) -> Option<Label> {
        Label::from_score(self.score)
    }
}

/// Binary training label.
///
/// `#[repr(u8)]` keeps the wire value equal to the class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Label {
    /// Rating of 2 or less.
    Negative = 0,
    /// Rating of 4 or more.
    Positive = 1,
}

impl Label {
    /// Maps a star rating to a label. Rating 3 is neutral and has no label.
    #[inline]
    pub const fn from_score(score: u8) -> Option<Self> {
        match score {
            3 => None,
            s if s >= 4 => Some(Label::Positive),
            _ => Some(Label::Negative),
        }
    }

    /// Class index (0 or 1).
    #[inline(always)]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Class index as a regression target.
    #[inline(always)]
    pub const fn target(self) -> f64 {
        match self {
            Label::Negative => 0.0,
            Label::Positive => 1.0,
        }
    }
}

/// Label reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    /// Positive-class probability at or above the threshold.
    Positive,
    /// Positive-class probability below the threshold.
    Negative,
    /// The item could not be vectorized or scored.
    Error,
}

impl SentimentLabel {
    /// Lowercase label name.
    pub const fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Error => "error",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Label> for SentimentLabel {
    fn from(label: Label) -> Self {
        match label {
            Label::Positive => SentimentLabel::Positive,
            Label::Negative => SentimentLabel::Negative,
        }
    }
}

/// Label and confidence produced by the threshold policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Chosen label.
    pub label: SentimentLabel,
    /// Certainty in the chosen label, in `[0.5, 1.0]` for real verdicts.
    pub confidence: f64,
}

/// Sentiment verdict attached to the caller's original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Text exactly as supplied by the caller.
    pub text: String,
    /// Chosen label.
    pub label: SentimentLabel,
    /// Certainty in the chosen label. `0.0` for error results.
    pub confidence: f64,
}

/// Coarse confidence bucket used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    /// Confidence of at least 0.8.
    High,
    /// Confidence of at least 0.6.
    Medium,
    /// Anything lower.
    Low,
}

impl SentimentResult {
    /// Confidence at or above which a result is [`ConfidenceBand::High`].
    pub const HIGH_CONFIDENCE: f64 = 0.8;
    /// Confidence at or above which a result is [`ConfidenceBand::Medium`].
    pub const MEDIUM_CONFIDENCE: f64 = 0.6;

    /// Attaches a verdict to its text.
    pub fn new(text: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            text: text.into(),
            label: verdict.label,
            confidence: verdict.confidence,
        }
    }

    /// Error-labeled result with zero confidence.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: SentimentLabel::Error,
            confidence: 0.0,
        }
    }

    /// Returns `true` for positive verdicts.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.label == SentimentLabel::Positive
    }

    /// Returns `true` for error results.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.label == SentimentLabel::Error
    }

    /// Confidence formatted as a percentage, e.g. `73.0%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }

    /// Display bucket for the confidence.
    pub fn band(&self) -> ConfidenceBand {
        if self.confidence >= Self::HIGH_CONFIDENCE {
            ConfidenceBand::High
        } else if self.confidence >= Self::MEDIUM_CONFIDENCE {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

impl fmt::Display for SentimentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.confidence_percent())
    }
}

/// Sparse feature row with strictly increasing column indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Builds a vector from `(column, value)` pairs.
    ///
    /// Pairs are sorted by column; duplicate columns are summed and exact zeros dropped.
    pub fn from_pairs(mut pairs: Vec<(u32, f64)>) -> Self {
        pairs.sort_unstable_by_key(|&(col, _)| col);

        let mut indices: Vec<u32> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());

        for (col, value) in pairs {
            match indices.last() {
                Some(&last) if last == col => {
                    if let Some(v) = values.last_mut() {
                        *v += value;
                    }
                }
                _ => {
                    indices.push(col);
                    values.push(value);
                }
            }
        }

        let mut out = Self { indices, values };
        out.retain_nonzero();
        out
    }

    fn retain_nonzero(&mut self) {
        let mut keep = 0usize;
        for i in 0..self.indices.len() {
            if self.values[i] != 0.0 {
                self.indices[keep] = self.indices[i];
                self.values[keep] = self.values[i];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    /// Column indices of the stored entries.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Values of the stored entries.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if every entry is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scales the vector to unit Euclidean length. Zero vectors stay zero.
    pub fn normalize_l2(&mut self) {
        let norm = self.l2_norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Dot product with a dense weight vector.
    ///
    /// Returns `None` if a column falls outside `weights`.
    pub fn checked_dot(&self, weights: &[f64]) -> Option<f64> {
        let mut acc = 0.0;
        for (col, value) in self.iter() {
            acc += weights.get(col as usize)? * value;
        }
        Some(acc)
    }

    /// Largest stored column, if any.
    #[inline]
    pub fn max_index(&self) -> Option<u32> {
        self.indices.last().copied()
    }
}

/// Row-major sparse feature matrix of fixed width.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    n_features: usize,
    rows: Vec<SparseVector>,
}

impl FeatureMatrix {
    /// Creates an empty matrix with `n_features` columns.
    pub fn new(n_features: usize) -> Self {
        Self {
            n_features,
            rows: Vec::new(),
        }
    }

    /// Creates a matrix from prepared rows.
    pub fn from_rows(n_features: usize, rows: Vec<SparseVector>) -> Self {
        Self { n_features, rows }
    }

    /// Appends a row.
    pub fn push(&mut self, row: SparseVector) {
        self.rows.push(row);
    }

    /// Number of columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the matrix has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `index`.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    /// All rows in order.
    #[inline]
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// Matrix made of the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            n_features: self.n_features,
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Shape as `(rows, columns)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_features)
    }
}

/// Which persisted artifact an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Fitted vocabulary and IDF weights.
    Vectorizer,
    /// Trained classifier.
    Classifier,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Vectorizer => f.write_str("vectorizer"),
            ArtifactKind::Classifier => f.write_str("classifier"),
        }
    }
}

/// Stage of a pipeline run.
///
/// Runs move strictly forward through `Idle → Fetching → Transforming →
/// Predicting → Done`. `Failed` is absorbing and reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Not started.
    Idle,
    /// Pulling records from the source.
    Fetching,
    /// Cleaning and vectorizing records.
    Transforming,
    /// Scoring vectors.
    Predicting,
    /// Finished with results.
    Done,
    /// Finished without results.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Transforming => "transforming",
            Stage::Predicting => "predicting",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors raised by the pipeline.
///
/// Only missing or corrupt artifacts and empty classes are fatal. Bad text
/// content never produces an error.
#[derive(Debug, thiserror::Error)]
pub enum PolarityError {
    /// One sentiment class has no examples after filtering neutral reviews.
    #[error("cannot balance classes: {negatives} negative / {positives} positive examples")]
    EmptyClass {
        /// Negative examples found.
        negatives: usize,
        /// Positive examples found.
        positives: usize,
    },

    /// An artifact file does not exist.
    #[error("{kind} artifact not found at {}", .path.display())]
    ArtifactNotFound {
        /// Which artifact.
        kind: ArtifactKind,
        /// Where it was expected.
        path: PathBuf,
    },

    /// An artifact exists but cannot be decoded or fails validation.
    #[error("{kind} artifact at {} is corrupt: {reason}", .path.display())]
    ArtifactCorrupt {
        /// Which artifact.
        kind: ArtifactKind,
        /// Where it was read from.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A record violates the review invariants.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord {
        /// Record identifier.
        id: String,
        /// Violated invariant.
        reason: String,
    },

    /// A frozen vectorizer weight is not a finite number.
    #[error("vectorizer weight for term {term:?} is not finite")]
    CorruptWeight {
        /// Term whose weight is unusable.
        term: String,
    },

    /// Feature widths disagree between vectorizer, vector and classifier.
    #[error("feature mismatch: expected {expected} features, got {actual}")]
    FeatureMismatch {
        /// Width the classifier was trained on.
        expected: usize,
        /// Width or column actually seen.
        actual: usize,
    },

    /// Training data or labels do not fit together.
    #[error("invalid training data: {0}")]
    InvalidTrainingData(String),

    /// A classifier reported a probability that is not a finite number.
    #[error("classifier returned a non-finite probability ({0})")]
    InvalidProbability(f64),

    /// A pipeline stage failed; no partial results were forwarded.
    #[error("pipeline failed while {stage}: {source}")]
    StageFailed {
        /// Stage that failed.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: Box<PolarityError>,
    },

    /// CSV ingestion failure.
    #[error("csv error: {0}")]
    Csv(String),

    /// Filesystem failure outside artifact lookup.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Vectorizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Maximum vocabulary size, ranked by corpus frequency.
    pub max_features: usize,
    /// Inclusive n-gram range, in tokens.
    pub ngram_range: (usize, usize),
    /// Tokens shorter than this many characters are not features.
    pub min_token_len: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 10_000,
            ngram_range: (1, 2),
            min_token_len: 2,
        }
    }
}

impl VectorizerConfig {
    /// Unigrams only, otherwise default.
    pub const fn unigrams(max_features: usize) -> Self {
        Self {
            max_features,
            ngram_range: (1, 1),
            min_token_len: 2,
        }
    }
}

/// Class balancing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Seed for sampling and shuffling.
    pub seed: u64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Held-out split settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of each class held out for evaluation.
    pub test_ratio: f64,
    /// Seed for the per-class shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            seed: 42,
        }
    }
}

/// Logistic regression settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Gradient step size.
    pub learning_rate: f64,
    /// Maximum full-batch iterations.
    pub max_iter: usize,
    /// L2 penalty on coefficients (not on the intercept).
    pub l2: f64,
    /// Stop once every gradient component is below this.
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1.0,
            max_iter: 1000,
            l2: 1e-4,
            tolerance: 1e-6,
        }
    }
}

/// Positive-class probabilities at or above this are positive.
///
/// Fixed, so every confidence lies in `[0.5, 1.0]`.
pub const POSITIVE_THRESHOLD: f64 = 0.5;

/// Everything needed for one training run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Vectorizer settings.
    pub vectorizer: VectorizerConfig,
    /// Balancing settings.
    pub balance: BalanceConfig,
    /// Held-out split settings.
    pub split: SplitConfig,
    /// Classifier settings.
    pub logistic: LogisticConfig,
}
