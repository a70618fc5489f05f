//! Vocabulary fitting.

use rustc_hash::FxHashMap;
use tracing::info;

use polarity_types::FeatureMatrix;

use crate::analyzer::NgramExtractor;
use crate::vectorizer::types::{TfidfVectorizer, VectorizerState, FORMAT_VERSION};

/// Corpus counts for one candidate term.
#[derive(Clone, Copy)]
struct TermCounts {
    total: u64,
    df: u32,
    last_doc: usize,
}

impl TfidfVectorizer {
    /// Builds a vocabulary and IDF weights from cleaned texts.
    ///
    /// Candidate terms are ranked by total count across the corpus, ties broken
    /// alphabetically, and the top `max_features` are kept. Columns are then
    /// assigned in alphabetical order. Weights use the smoothed IDF
    /// `ln((1 + n) / (1 + df)) + 1`.
    pub fn fit<S: AsRef<str>>(&self, texts: &[S]) -> VectorizerState {
        let extractor = NgramExtractor::from_config(&self.config);
        let mut ids: FxHashMap<String, usize> = FxHashMap::default();
        let mut counts: Vec<TermCounts> = Vec::new();

        for (doc, text) in texts.iter().enumerate() {
            extractor.extract(text.as_ref(), |gram| {
                let id = match ids.get(gram) {
                    Some(&id) => id,
                    None => {
                        let id = counts.len();
                        ids.insert(gram.to_owned(), id);
                        counts.push(TermCounts {
                            total: 0,
                            df: 0,
                            last_doc: usize::MAX,
                        });
                        id
                    }
                };

                let entry = &mut counts[id];
                entry.total += 1;
                if entry.last_doc != doc {
                    entry.df += 1;
                    entry.last_doc = doc;
                }
            });
        }

        let candidates = ids.len();
        let mut ranked: Vec<(String, TermCounts)> = ids
            .into_iter()
            .map(|(term, id)| (term, counts[id]))
            .collect();

        if ranked.len() > self.config.max_features {
            ranked.sort_unstable_by(|(ta, a), (tb, b)| b.total.cmp(&a.total).then_with(|| ta.cmp(tb)));
            ranked.truncate(self.config.max_features);
        }
        ranked.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        let n = texts.len() as f64;
        let (terms, idf): (Vec<String>, Vec<f64>) = ranked
            .into_iter()
            .map(|(term, c)| (term, ((1.0 + n) / (1.0 + c.df as f64)).ln() + 1.0))
            .unzip();

        info!(
            documents = texts.len(),
            candidates,
            vocabulary = terms.len(),
            "fitted vectorizer"
        );

        VectorizerState {
            version: FORMAT_VERSION,
            config: self.config,
            n_documents: texts.len(),
            terms,
            idf,
        }
    }

    /// Fits on `texts` and returns their feature matrix with the frozen state.
    ///
    /// Training-time entry point. Inference must reuse the returned state
    /// through [`VectorizerState::transform`] and never fit again.
    pub fn fit_transform<S: AsRef<str>>(&self, texts: &[S]) -> (FeatureMatrix, VectorizerState) {
        let state = self.fit(texts);
        let matrix = state.transform_fitted(texts);
        (matrix, state)
    }
}
