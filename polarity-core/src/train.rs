//! Offline training run.
//!
//! fetch → label and balance → clean → fit vectorizer → stratified split →
//! fit classifier → evaluate → save both artifacts. This is the single
//! writer of the artifacts; inference only ever loads them.

use core::fmt;
use std::path::PathBuf;

use tracing::info;

use polarity_types::{FeatureMatrix, Label, PipelineConfig, Result, Review, SentimentLabel};

use crate::artifact::ArtifactPaths;
use crate::dataset::stratified_split;
use crate::evaluate::ClassificationReport;
use crate::fetch::Fetcher;
use crate::model::{LogisticModel, LogisticRegression, Trainer};
use crate::predict::{Predictor, ThresholdPredictor};
use crate::transform::TrainingTransform;
use crate::vectorizer::{VectorizerState, VectorizerStats};

/// Fitted artifacts, not yet saved, with their evaluation.
#[derive(Debug, Clone)]
pub struct FittedModels {
    pub state: VectorizerState,
    pub model: LogisticModel,
    pub report: TrainingReport,
}

/// What a training run did.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Reviews received from the fetcher.
    pub fetched: usize,
    /// Examples per class after balancing.
    pub per_class: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub vectorizer: VectorizerStats,
    pub train_accuracy: f64,
    /// Held-out metrics.
    pub test: ClassificationReport,
    /// Where the artifacts were written, once saved.
    pub paths: Option<ArtifactPaths>,
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reviews fetched   : {}", self.fetched)?;
        writeln!(f, "Per class         : {}", self.per_class)?;
        writeln!(f, "Train / test      : {} / {}", self.train_size, self.test_size)?;
        writeln!(f, "Vectorizer        : {}", self.vectorizer)?;
        writeln!(f, "Train accuracy    : {:.4}", self.train_accuracy)?;
        writeln!(f, "Test accuracy     : {:.4}", self.test.accuracy)?;
        writeln!(f, "Test macro F1     : {:.4}", self.test.macro_f1())?;
        if let Some(paths) = &self.paths {
            writeln!(f, "Vectorizer saved  : {}", paths.vectorizer.display())?;
            writeln!(f, "Model saved       : {}", paths.classifier.display())?;
        }
        write!(f, "\n{}", self.test)
    }
}

fn predicted_labels(
    predictor: &ThresholdPredictor<LogisticModel>,
    features: &FeatureMatrix,
) -> Result<Vec<Label>> {
    Ok(predictor
        .predict_matrix(features)?
        .into_iter()
        .map(|v| match v.label {
            SentimentLabel::Positive => Label::Positive,
            _ => Label::Negative,
        })
        .collect())
}

fn pick(labels: &[Label], indices: &[usize]) -> Vec<Label> {
    indices.iter().filter_map(|&i| labels.get(i).copied()).collect()
}

/// Fits the vectorizer and classifier in memory.
///
/// # Errors
///
/// [`polarity_types::PolarityError::EmptyClass`] if either class is missing.
pub fn fit_models(reviews: &[Review], config: &PipelineConfig) -> Result<FittedModels> {
    let set = TrainingTransform::new(config.vectorizer, config.balance).fit(reviews)?;
    let split = stratified_split(&set.labels, config.split);

    let train_x = set.features.select(&split.train);
    let train_y = pick(&set.labels, &split.train);
    let test_x = set.features.select(&split.test);
    let test_y = pick(&set.labels, &split.test);

    let model = LogisticRegression::new(config.logistic).fit(&train_x, &train_y)?;
    let predictor = ThresholdPredictor::new(model);

    let train_accuracy =
        ClassificationReport::from_predictions(&train_y, &predicted_labels(&predictor, &train_x)?)
            .accuracy;
    let test = ClassificationReport::from_predictions(&test_y, &predicted_labels(&predictor, &test_x)?);

    info!(
        train = split.train.len(),
        test = split.test.len(),
        train_accuracy,
        test_accuracy = test.accuracy,
        test_macro_f1 = test.macro_f1(),
        "trained classifier"
    );

    let report = TrainingReport {
        fetched: reviews.len(),
        per_class: set.dataset.per_class(),
        train_size: split.train.len(),
        test_size: split.test.len(),
        vectorizer: set.state.stats(),
        train_accuracy,
        test,
        paths: None,
    };

    Ok(FittedModels {
        state: set.state,
        model: predictor.classifier().clone(),
        report,
    })
}

/// Runs a full training pass and writes both artifacts.
pub fn train<F: Fetcher>(
    fetcher: &F,
    config: &PipelineConfig,
    paths: &ArtifactPaths,
) -> Result<TrainingReport> {
    let reviews = fetcher.fetch()?;
    info!(reviews = reviews.len(), "starting training run");

    let FittedModels {
        state,
        model,
        mut report,
    } = fit_models(&reviews, config)?;

    state.save(&paths.vectorizer)?;
    model.save(&paths.classifier)?;
    report.paths = Some(paths.clone());
    Ok(report)
}

/// Default artifact directory, relative to the working directory.
pub fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::VecFetcher;
    use polarity_types::PolarityError;

    fn corpus() -> Vec<Review> {
        let good = ["great taste", "love it", "tasty and fresh", "works great", "excellent value"];
        let bad = ["awful taste", "stale and bitter", "arrived broken", "terrible value", "never again"];
        let mut reviews = Vec::new();
        for i in 0..40 {
            let g = good[i % good.len()];
            let b = bad[i % bad.len()];
            reviews.push(Review::new(format!("g{i}"), "p", "u", 5, g));
            reviews.push(Review::new(format!("b{i}"), "p", "u", 1, b));
        }
        reviews.push(Review::new("n", "p", "u", 3, "it is fine"));
        reviews
    }

    #[test]
    fn fit_models_reports_sizes() {
        let fitted = fit_models(&corpus(), &PipelineConfig::default()).unwrap();
        let r = &fitted.report;
        assert_eq!(r.fetched, 81);
        assert_eq!(r.per_class, 40);
        assert_eq!(r.train_size + r.test_size, 80);
        assert_eq!(r.test_size, 16);
        assert_eq!(r.test.support(), 16);
        assert_eq!(fitted.model.coefficients().len(), fitted.state.n_features());
        assert!(r.paths.is_none());
    }

    #[test]
    fn separable_corpus_is_learned() {
        let fitted = fit_models(&corpus(), &PipelineConfig::default()).unwrap();
        assert_eq!(fitted.report.train_accuracy, 1.0);
        assert_eq!(fitted.report.test.accuracy, 1.0);
    }

    #[test]
    fn training_is_deterministic() {
        let a = fit_models(&corpus(), &PipelineConfig::default()).unwrap();
        let b = fit_models(&corpus(), &PipelineConfig::default()).unwrap();
        assert_eq!(a.state, b.state);
        assert_eq!(a.model, b.model);
    }

    #[test]
    fn train_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path().join("models"));
        let report = train(&VecFetcher::new(corpus()), &PipelineConfig::default(), &paths).unwrap();

        assert!(paths.status().is_ready());
        assert_eq!(report.paths.as_ref(), Some(&paths));
        let text = report.to_string();
        assert!(text.contains("Test accuracy"));
        assert!(text.contains("Test macro F1     : 1.0000"));
    }

    #[test]
    fn single_class_is_refused() {
        let positives: Vec<Review> = corpus().into_iter().filter(|r| r.score == 5).collect();
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let err = train(&VecFetcher::new(positives), &PipelineConfig::default(), &paths).unwrap_err();

        assert!(matches!(err, PolarityError::EmptyClass { negatives: 0, positives: 40 }));
        assert!(!paths.status().vectorizer.exists());
    }
}
