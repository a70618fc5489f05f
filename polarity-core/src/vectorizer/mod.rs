//! TF-IDF feature extraction.
//!
//! [`TfidfVectorizer::fit_transform`] is the only way to build a
//! [`VectorizerState`]. Once built, the state is frozen: inference and
//! held-out evaluation go through [`VectorizerState::transform`], which reads
//! the vocabulary and never changes it.
//!
//! Layout:
//! - The vocabulary is a sorted `Vec<String>`; a term's column is its position
//! - Lookups are binary searches, with no hash map to rebuild after loading
//! - Rows are [`SparseVector`](polarity_types::SparseVector)s, L2-normalized
//!
//! Threading:
//! - A loaded [`VectorizerState`] is immutable and can be shared across
//!   threads behind an `Arc` without locking.

mod builder;
mod persist;
mod stats;
mod transform;
mod types;

pub use stats::VectorizerStats;
pub use types::{TfidfVectorizer, VectorizerState, FORMAT_VERSION};

#[cfg(test)]
mod tests {
    use super::*;
    use polarity_types::{PolarityError, VectorizerConfig};
    use std::path::Path;

    fn corpus() -> Vec<&'static str> {
        vec!["great work well", "bad work"]
    }

    fn fitted() -> VectorizerState {
        TfidfVectorizer::default().fit(&corpus())
    }

    fn idf_for(df: f64, n: f64) -> f64 {
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    }

    #[test]
    fn vocabulary_is_sorted_unigrams_and_bigrams() {
        let state = fitted();
        assert_eq!(
            state.terms(),
            ["bad", "bad work", "great", "great work", "well", "work", "work well"]
        );
        assert_eq!(state.n_features(), 7);
        assert_eq!(state.n_documents(), 2);
    }

    #[test]
    fn smoothed_idf() {
        let state = fitted();
        let work = state.column("work").unwrap() as usize;
        let great = state.column("great").unwrap() as usize;
        assert_eq!(state.idf()[work], 1.0);
        assert!((state.idf()[great] - idf_for(1.0, 2.0)).abs() < 1e-12);
    }

    #[test]
    fn row_values_and_norm() {
        let state = fitted();
        let row = state.transform_one("great work well").unwrap();
        assert_eq!(row.nnz(), 5);
        assert!((row.l2_norm() - 1.0).abs() < 1e-12);

        let rare = idf_for(1.0, 2.0);
        let norm = (4.0 * rare * rare + 1.0f64).sqrt();
        let work = state.column("work").unwrap();
        let value = row.iter().find(|&(c, _)| c == work).map(|(_, v)| v).unwrap();
        assert!((value - 1.0 / norm).abs() < 1e-12);
    }

    #[test]
    fn repeated_terms_count() {
        let state = fitted();
        let row = state.transform_one("bad bad").unwrap();
        // "bad bad" is not a vocabulary bigram; only "bad" contributes.
        assert_eq!(row.nnz(), 1);
        assert!((row.values()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_text_is_zero_row() {
        let state = fitted();
        let row = state.transform_one("nothing here matches").unwrap();
        assert!(row.is_zero());
        assert!(state.transform_one("").unwrap().is_zero());
    }

    #[test]
    fn transform_does_not_change_state() {
        let state = fitted();
        let before = state.clone();
        let m = state.transform(&["brand new words", "great"]).unwrap();
        assert_eq!(state, before);
        assert_eq!(m.shape(), (2, 7));
    }

    #[test]
    fn fit_transform_matches_transform() {
        let (matrix, state) = TfidfVectorizer::default().fit_transform(&corpus());
        let again = state.transform(&corpus()).unwrap();
        assert_eq!(matrix, again);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let v = TfidfVectorizer::new(VectorizerConfig::unigrams(2));
        let state = v.fit(&["aa bb", "aa cc", "aa bb"]);
        assert_eq!(state.terms(), ["aa", "bb"]);
    }

    #[test]
    fn frequency_ties_break_alphabetically() {
        let v = TfidfVectorizer::new(VectorizerConfig::unigrams(1));
        let state = v.fit(&["zz yy"]);
        assert_eq!(state.terms(), ["yy"]);
    }

    #[test]
    fn single_char_tokens_ignored() {
        let state = TfidfVectorizer::default().fit(&["a great b"]);
        assert_eq!(state.terms(), ["great"]);
    }

    #[test]
    fn fitting_is_deterministic() {
        let texts = ["one two three", "two three four", "four five"];
        let a = TfidfVectorizer::default().fit(&texts);
        let b = TfidfVectorizer::default().fit(&texts);
        assert_eq!(a, b);
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn empty_corpus() {
        let (m, state) = TfidfVectorizer::default().fit_transform::<&str>(&[]);
        assert_eq!(state.n_features(), 0);
        assert!(m.is_empty());
        assert!(state.transform_one("anything").unwrap().is_zero());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectorizer.bin");
        let state = fitted();

        state.save(&path).unwrap();
        let loaded = VectorizerState::load(&path).unwrap();

        assert_eq!(loaded, state);
        assert_eq!(loaded.to_bytes().unwrap(), state.to_bytes().unwrap());
        assert_eq!(
            loaded.transform(&corpus()).unwrap(),
            state.transform(&corpus()).unwrap()
        );
    }

    #[test]
    fn missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorizerState::load(dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, PolarityError::ArtifactNotFound { .. }));
    }

    #[test]
    fn truncated_artifact_is_corrupt() {
        let bytes = fitted().to_bytes().unwrap();
        let err = VectorizerState::from_bytes(&bytes[..bytes.len() / 2], Path::new("v.bin"))
            .unwrap_err();
        assert!(matches!(err, PolarityError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn unsorted_vocabulary_is_corrupt() {
        let mut state = fitted();
        state.terms.swap(0, 1);
        let bytes = state.to_bytes().unwrap();
        let err = VectorizerState::from_bytes(&bytes, Path::new("v.bin")).unwrap_err();
        assert!(matches!(err, PolarityError::ArtifactCorrupt { .. }));
    }

    #[test]
    fn length_mismatch_is_corrupt() {
        let mut state = fitted();
        state.idf.pop();
        let bytes = state.to_bytes().unwrap();
        assert!(VectorizerState::from_bytes(&bytes, Path::new("v.bin")).is_err());
    }

    #[test]
    fn version_mismatch_is_corrupt() {
        let mut state = fitted();
        state.version = FORMAT_VERSION + 1;
        let bytes = state.to_bytes().unwrap();
        let err = VectorizerState::from_bytes(&bytes, Path::new("v.bin")).unwrap_err();
        assert!(err.to_string().contains("format version"));
    }

    #[test]
    fn non_finite_weight_fails_only_rows_using_it() {
        let mut state = fitted();
        let col = state.column("bad").unwrap() as usize;
        state.idf[col] = f64::NAN;

        let loaded =
            VectorizerState::from_bytes(&state.to_bytes().unwrap(), Path::new("v.bin")).unwrap();
        assert_eq!(loaded, state);

        assert!(loaded.transform_one("great work").is_ok());
        match loaded.transform_one("bad day") {
            Err(PolarityError::CorruptWeight { term }) => assert_eq!(term, "bad"),
            other => panic!("expected corrupt weight, got {other:?}"),
        }
        assert!(loaded.transform(&["great", "bad"]).is_err());
    }

    #[test]
    fn stats_summary() {
        let stats = fitted().stats();
        assert_eq!(stats.num_documents, 2);
        assert_eq!(stats.num_terms, 7);
        assert_eq!(stats.num_multiword, 3);
        assert_eq!(stats.min_idf, Some(1.0));
        let text = stats.to_string();
        assert!(text.contains("7 terms"));
        assert!(text.contains("idf"));
    }
}
