//! Text analysis pipeline.
//!
//! This module provides the text processing components:
//! - **Normalizer**: Cleans raw review text into lowercase lemmas
//! - **Tokenizer**: Splits cleaned text into tokens
//! - **Lemmatizer**: Reduces verb inflections to a base form
//! - **Stopwords**: English function words dropped during cleaning
//! - **Ngram**: Builds the word n-gram terms used as vocabulary

pub mod lemmatizer;
pub mod ngram;
pub mod normalizer;
pub mod stopwords;
pub mod tokenizer;

pub use lemmatizer::VerbLemmatizer;
pub use ngram::NgramExtractor;
pub use normalizer::{NormalizerConfig, TextNormalizer};
pub use stopwords::StopWords;
pub use tokenizer::Tokenizer;
