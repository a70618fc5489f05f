//! Feature engineering and inference for review sentiment.
//!
//! The crate turns raw product reviews into TF-IDF feature rows and binary
//! sentiment verdicts:
//!
//! - **Training**: [`dataset`] labels and balances reviews, [`vectorizer`]
//!   fits a frozen vocabulary, [`model`] trains a classifier, [`train`] saves both
//! - **Inference**: [`inference::SentimentService`] loads the two artifacts
//!   once and scores single texts or batches with per-item isolation
//! - **Orchestration**: [`pipeline::Pipeline`] runs fetch → transform → predict
//!   with fail-fast stage tracking
//!
//! Everything is synchronous. Loaded artifacts are immutable and can be
//! shared across threads.
//!
//! ```
//! use polarity_core::analyzer::TextNormalizer;
//!
//! let clean = TextNormalizer::default().normalize("Great! <br/>Works well.");
//! assert_eq!(clean, "great work well");
//! ```

pub mod analyzer;
pub mod artifact;
pub mod dataset;
pub mod evaluate;
pub mod fetch;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod train;
pub mod transform;
pub mod vectorizer;

pub use artifact::ArtifactPaths;
pub use dataset::{derive_and_balance, BalancedDataset};
pub use evaluate::{BatchSummary, ClassificationReport};
pub use fetch::{CsvFetcher, Fetcher, VecFetcher};
pub use inference::SentimentService;
pub use pipeline::{run_pipeline, Pipeline};
pub use predict::{Predictor, ThresholdPredictor};
pub use train::{fit_models, train, TrainingReport};
pub use transform::{InferenceTransform, TrainingTransform, Transformer};
pub use vectorizer::{TfidfVectorizer, VectorizerState};
