//! Fetch, transform, predict.
//!
//! A run walks `Idle → Fetching → Transforming → Predicting → Done`. Any
//! stage error moves the run to `Failed` and is returned wrapped in
//! [`PolarityError::StageFailed`]; nothing from a failed stage is forwarded.
//! The collaborators are injected, so the same pipeline can be run again.

use tracing::{info, warn};

use polarity_types::{PolarityError, Result, SentimentResult, Stage};

use crate::fetch::Fetcher;
use crate::predict::Predictor;
use crate::transform::Transformer;

/// Fetcher, transformer and predictor wired in sequence.
#[derive(Debug)]
pub struct Pipeline<F, T, P> {
    fetcher: F,
    transformer: T,
    predictor: P,
    stage: Stage,
    transitions: Vec<Stage>,
}

impl<F, T, P> Pipeline<F, T, P>
where
    F: Fetcher,
    T: Transformer,
    P: Predictor,
{
    pub fn new(fetcher: F, transformer: T, predictor: P) -> Self {
        Self {
            fetcher,
            transformer,
            predictor,
            stage: Stage::Idle,
            transitions: vec![Stage::Idle],
        }
    }

    /// Stage reached by the last run, `Idle` before the first.
    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stages visited by the last run, starting with `Idle`.
    #[inline]
    pub fn transitions(&self) -> &[Stage] {
        &self.transitions
    }

    fn enter(&mut self, stage: Stage) {
        info!(from = %self.stage, to = %stage, "pipeline stage");
        self.stage = stage;
        self.transitions.push(stage);
    }

    fn fail(&mut self, stage: Stage, source: PolarityError) -> PolarityError {
        warn!(%stage, error = %source, "pipeline failed");
        self.stage = Stage::Failed;
        self.transitions.push(Stage::Failed);
        PolarityError::StageFailed {
            stage,
            source: Box::new(source),
        }
    }

    /// Runs every stage once.
    ///
    /// # Errors
    ///
    /// [`PolarityError::StageFailed`] naming the stage that failed.
    pub fn run(&mut self) -> Result<Vec<SentimentResult>> {
        self.stage = Stage::Idle;
        self.transitions.clear();
        self.transitions.push(Stage::Idle);

        self.enter(Stage::Fetching);
        let reviews = match self.fetcher.fetch() {
            Ok(reviews) => reviews,
            Err(err) => return Err(self.fail(Stage::Fetching, err)),
        };

        self.enter(Stage::Transforming);
        let batch = match self.transformer.transform(&reviews) {
            Ok(batch) => batch,
            Err(err) => return Err(self.fail(Stage::Transforming, err)),
        };

        self.enter(Stage::Predicting);
        let verdicts = match self.predictor.predict_matrix(&batch.features) {
            Ok(verdicts) => verdicts,
            Err(err) => return Err(self.fail(Stage::Predicting, err)),
        };

        let results: Vec<SentimentResult> = batch
            .texts
            .into_iter()
            .zip(verdicts)
            .map(|(text, verdict)| SentimentResult::new(text, verdict))
            .collect();

        self.enter(Stage::Done);
        info!(results = results.len(), "pipeline finished");
        Ok(results)
    }
}

/// Builds a pipeline and runs it once.
pub fn run_pipeline<F, T, P>(fetcher: F, transformer: T, predictor: P) -> Result<Vec<SentimentResult>>
where
    F: Fetcher,
    T: Transformer,
    P: Predictor,
{
    Pipeline::new(fetcher, transformer, predictor).run()
}
