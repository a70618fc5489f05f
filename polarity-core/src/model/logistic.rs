//! Binary logistic regression over sparse TF-IDF rows.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use polarity_types::{
    ArtifactKind, FeatureMatrix, Label, LogisticConfig, PolarityError, Result, SparseVector,
};

use crate::artifact;
use crate::model::{Classifier, Decision, Trainer};

const KIND: ArtifactKind = ArtifactKind::Classifier;

/// Version written into every persisted [`LogisticModel`].
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Numerically stable logistic function.
#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Full-batch gradient descent trainer with an L2 penalty.
///
/// # Example
///
/// ```
/// use polarity_core::model::{Classifier, LogisticRegression, Trainer};
/// use polarity_types::{FeatureMatrix, Label, SparseVector};
///
/// let rows = vec![
///     SparseVector::from_pairs(vec![(0, 1.0)]),
///     SparseVector::from_pairs(vec![(1, 1.0)]),
/// ];
/// let x = FeatureMatrix::from_rows(2, rows);
/// let model = LogisticRegression::default()
///     .fit(&x, &[Label::Positive, Label::Negative])
///     .unwrap();
///
/// assert_eq!(model.n_features(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LogisticRegression {
    config: LogisticConfig,
}

impl LogisticRegression {
    /// Trainer with `config`.
    pub fn new(config: LogisticConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> LogisticConfig {
        self.config
    }
}

impl Trainer for LogisticRegression {
    type Model = LogisticModel;

    fn fit(&self, features: &FeatureMatrix, labels: &[Label]) -> Result<LogisticModel> {
        let n_samples = features.n_rows();
        let n_features = features.n_features();

        if n_samples != labels.len() {
            return Err(PolarityError::InvalidTrainingData(format!(
                "{n_samples} rows but {} labels",
                labels.len()
            )));
        }
        if n_samples == 0 {
            return Err(PolarityError::InvalidTrainingData(
                "cannot fit with zero samples".to_owned(),
            ));
        }
        if let Some(max) = features.rows().iter().filter_map(SparseVector::max_index).max() {
            if max as usize >= n_features {
                return Err(PolarityError::FeatureMismatch {
                    expected: n_features,
                    actual: max as usize + 1,
                });
            }
        }

        let cfg = self.config;
        let n = n_samples as f64;
        let mut coefficients = vec![0.0f64; n_features];
        let mut intercept = 0.0f64;
        let mut grad = vec![0.0f64; n_features];
        let mut iterations = 0usize;

        for _ in 0..cfg.max_iter {
            iterations += 1;
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut intercept_grad = 0.0;

            for (row, label) in features.rows().iter().zip(labels) {
                let z = intercept
                    + row
                        .iter()
                        .map(|(c, v)| coefficients[c as usize] * v)
                        .sum::<f64>();
                let error = sigmoid(z) - label.target();
                intercept_grad += error;
                for (c, v) in row.iter() {
                    grad[c as usize] += error * v;
                }
            }

            intercept_grad /= n;
            let mut max_grad = intercept_grad.abs();
            for (g, w) in grad.iter_mut().zip(&coefficients) {
                *g = *g / n + cfg.l2 * w;
                max_grad = max_grad.max(g.abs());
            }

            intercept -= cfg.learning_rate * intercept_grad;
            for (w, g) in coefficients.iter_mut().zip(&grad) {
                *w -= cfg.learning_rate * g;
            }

            if max_grad < cfg.tolerance {
                break;
            }
        }

        debug!(iterations, n_samples, n_features, "logistic regression converged");

        Ok(LogisticModel {
            version: MODEL_FORMAT_VERSION,
            coefficients,
            intercept,
            iterations,
        })
    }
}

/// Trained logistic regression weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    version: u32,
    coefficients: Vec<f64>,
    intercept: f64,
    iterations: usize,
}

impl LogisticModel {
    /// Builds a model from known weights.
    pub fn from_weights(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            version: MODEL_FORMAT_VERSION,
            coefficients,
            intercept,
            iterations: 0,
        }
    }

    /// One weight per feature column.
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Bias term added before the sigmoid.
    #[inline]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Gradient steps taken during training.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Probability that `row` is positive.
    pub fn predict_proba(&self, row: &SparseVector) -> Result<f64> {
        let z = row
            .checked_dot(&self.coefficients)
            .ok_or_else(|| PolarityError::FeatureMismatch {
                expected: self.coefficients.len(),
                actual: row.max_index().map_or(0, |m| m as usize + 1),
            })?;
        Ok(sigmoid(self.intercept + z))
    }

    /// Serializes the model as an artifact blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        artifact::encode(KIND, self)
    }

    /// Deserializes and validates a model. `origin` is only used in errors.
    pub fn from_bytes(bytes: &[u8], origin: &Path) -> Result<Self> {
        let model: Self = artifact::decode(KIND, origin, bytes)?;
        let reason = if model.version != MODEL_FORMAT_VERSION {
            Some(format!(
                "format version {} (expected {MODEL_FORMAT_VERSION})",
                model.version
            ))
        } else if !model.intercept.is_finite() || !model.coefficients.iter().all(|w| w.is_finite())
        {
            Some("non-finite weights".to_owned())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(PolarityError::ArtifactCorrupt {
                kind: KIND,
                path: origin.to_path_buf(),
                reason,
            }),
            None => Ok(model),
        }
    }

    /// Writes the model to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        artifact::write_blob(KIND, path.as_ref(), &self.to_bytes()?)
    }

    /// Reads a model from `path`.
    ///
    /// # Errors
    ///
    /// [`PolarityError::ArtifactNotFound`] if the file is missing,
    /// [`PolarityError::ArtifactCorrupt`] if it cannot be used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model = Self::from_bytes(&artifact::read_blob(KIND, path)?, path)?;
        info!(path = %path.display(), features = model.coefficients.len(), "loaded classifier");
        Ok(model)
    }
}

impl Classifier for LogisticModel {
    #[inline]
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn decide(&self, row: &SparseVector) -> Result<Decision> {
        self.predict_proba(row).map(Decision::Probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Column 0 marks positives, column 1 negatives, column 2 is noise.
    fn separable() -> (FeatureMatrix, Vec<Label>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let noise = (i % 3) as f64 * 0.1;
            if i % 2 == 0 {
                rows.push(SparseVector::from_pairs(vec![(0, 1.0), (2, noise)]));
                labels.push(Label::Positive);
            } else {
                rows.push(SparseVector::from_pairs(vec![(1, 1.0), (2, noise)]));
                labels.push(Label::Negative);
            }
        }
        (FeatureMatrix::from_rows(3, rows), labels)
    }

    #[test]
    fn sigmoid_shape() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
    }

    #[test]
    fn learns_separable_data() {
        let (x, y) = separable();
        let model = LogisticRegression::default().fit(&x, &y).unwrap();

        for (row, label) in x.rows().iter().zip(&y) {
            let p = model.predict_proba(row).unwrap();
            match label {
                Label::Positive => assert!(p > 0.5, "p = {p}"),
                Label::Negative => assert!(p < 0.5, "p = {p}"),
            }
        }
        assert!(model.coefficients()[0] > 0.0);
        assert!(model.coefficients()[1] < 0.0);
        assert!(model.iterations() > 0);
    }

    #[test]
    fn zero_row_uses_intercept() {
        let model = LogisticModel::from_weights(vec![1.0, -1.0], 0.0);
        assert_eq!(model.predict_proba(&SparseVector::default()).unwrap(), 0.5);
    }

    #[test]
    fn out_of_width_row_is_mismatch() {
        let model = LogisticModel::from_weights(vec![1.0, -1.0], 0.0);
        let row = SparseVector::from_pairs(vec![(5, 1.0)]);
        assert!(matches!(
            model.decide(&row),
            Err(PolarityError::FeatureMismatch {
                expected: 2,
                actual: 6
            })
        ));
    }

    #[test]
    fn rejects_label_count_mismatch() {
        let (x, mut y) = separable();
        y.pop();
        assert!(matches!(
            LogisticRegression::default().fit(&x, &y),
            Err(PolarityError::InvalidTrainingData(_))
        ));
    }

    #[test]
    fn rejects_empty_training_set() {
        let x = FeatureMatrix::new(4);
        assert!(LogisticRegression::default().fit(&x, &[]).is_err());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let (x, y) = separable();
        let model = LogisticRegression::default().fit(&x, &y).unwrap();

        model.save(&path).unwrap();
        let loaded = LogisticModel::load(&path).unwrap();
        assert_eq!(loaded, model);
    }

    #[test]
    fn missing_and_corrupt_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        assert!(matches!(
            LogisticModel::load(&path),
            Err(PolarityError::ArtifactNotFound { .. })
        ));

        std::fs::write(&path, b"not a model").unwrap();
        assert!(matches!(
            LogisticModel::load(&path),
            Err(PolarityError::ArtifactCorrupt { .. })
        ));
    }

    #[test]
    fn non_finite_weights_are_corrupt() {
        let model = LogisticModel::from_weights(vec![f64::INFINITY], 0.0);
        let bytes = model.to_bytes().unwrap();
        assert!(matches!(
            LogisticModel::from_bytes(&bytes, Path::new("m.bin")),
            Err(PolarityError::ArtifactCorrupt { .. })
        ));
    }
}
