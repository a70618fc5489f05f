//! Single and batch sentiment inference.
//!
//! A [`SentimentService`] owns a frozen vectorizer and a trained classifier,
//! both loaded once and shared read-only. `predict_single` reports failures
//! as errors; `predict_batch` never fails as a whole: an item that cannot be
//! vectorized or scored becomes an error-labeled result in its own slot.

use tracing::{info, warn};

use polarity_types::{PolarityError, Result, SentimentResult, SparseVector, Verdict};

use crate::artifact::ArtifactPaths;
use crate::model::{Classifier, LogisticModel};
use crate::predict::{Predictor, ThresholdPredictor};
use crate::transform::InferenceTransform;
use crate::vectorizer::VectorizerState;

/// Text-in, verdict-out service over loaded artifacts.
#[derive(Debug, Clone)]
pub struct SentimentService<C> {
    transform: InferenceTransform,
    predictor: ThresholdPredictor<C>,
}

impl<C: Classifier> SentimentService<C> {
    /// Pairs a transform with a predictor of the same width.
    ///
    /// # Errors
    ///
    /// [`PolarityError::FeatureMismatch`] if the classifier was trained on a
    /// different number of columns than the vectorizer produces.
    pub fn new(transform: InferenceTransform, predictor: ThresholdPredictor<C>) -> Result<Self> {
        let expected = predictor.n_features();
        let actual = transform.n_features();
        if expected != actual {
            return Err(PolarityError::FeatureMismatch { expected, actual });
        }
        Ok(Self {
            transform,
            predictor,
        })
    }

    #[inline]
    pub fn transform(&self) -> &InferenceTransform {
        &self.transform
    }

    #[inline]
    pub fn predictor(&self) -> &ThresholdPredictor<C> {
        &self.predictor
    }

    fn verdict(&self, text: &str) -> Result<Verdict> {
        let row: SparseVector = self.transform.transform_text(text)?;
        self.predictor.predict(&row)
    }

    /// Verdict for one text. The result carries `text` unchanged.
    pub fn predict_single(&self, text: &str) -> Result<SentimentResult> {
        self.verdict(text).map(|v| SentimentResult::new(text, v))
    }

    /// One result per input, in input order.
    ///
    /// Equal, item for item, to calling [`predict_single`](Self::predict_single)
    /// on each text, except that failures become
    /// [`SentimentResult::error`] entries.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentResult> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let text = text.as_ref();
                match self.predict_single(text) {
                    Ok(result) => result,
                    Err(err) => {
                        warn!(index, error = %err, "batch item failed");
                        SentimentResult::error(text)
                    }
                }
            })
            .collect()
    }
}

impl SentimentService<LogisticModel> {
    /// Loads both artifacts.
    ///
    /// # Errors
    ///
    /// [`PolarityError::ArtifactNotFound`] or [`PolarityError::ArtifactCorrupt`]
    /// for either artifact, or [`PolarityError::FeatureMismatch`] if they were
    /// not trained together. No service is built from one artifact alone.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let state = VectorizerState::load(&paths.vectorizer)?;
        let model = LogisticModel::load(&paths.classifier)?;
        let service = Self::new(
            InferenceTransform::new(state),
            ThresholdPredictor::new(model),
        )?;
        info!(
            features = service.transform.n_features(),
            "sentiment service ready"
        );
        Ok(service)
    }
}
