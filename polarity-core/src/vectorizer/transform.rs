//! Transforming text with a frozen vocabulary.

use smallvec::SmallVec;

use polarity_types::{FeatureMatrix, PolarityError, Result, SparseVector};

use crate::vectorizer::types::VectorizerState;

impl VectorizerState {
    /// TF-IDF row for one cleaned text.
    ///
    /// Terms outside the vocabulary are ignored, so text with no known terms
    /// gives an all-zero row. The row is L2-normalized.
    ///
    /// # Errors
    ///
    /// Returns [`PolarityError::CorruptWeight`] if a matched term's weight is
    /// not finite.
    pub fn transform_one(&self, text: &str) -> Result<SparseVector> {
        let mut columns: SmallVec<[u32; 128]> = SmallVec::new();
        self.extractor().extract(text, |gram| {
            if let Some(col) = self.column(gram) {
                columns.push(col);
            }
        });
        columns.sort_unstable();

        let mut pairs: Vec<(u32, f64)> = Vec::with_capacity(columns.len());
        for run in columns.chunk_by(|a, b| a == b) {
            let col = run[0];
            let weight = self.idf[col as usize];
            if !weight.is_finite() {
                return Err(PolarityError::CorruptWeight {
                    term: self.terms[col as usize].clone(),
                });
            }
            pairs.push((col, run.len() as f64 * weight));
        }

        let mut row = SparseVector::from_pairs(pairs);
        row.normalize_l2();
        Ok(row)
    }

    /// Transforms a batch of cleaned texts. Never changes the state.
    ///
    /// # Errors
    ///
    /// Fails on the first row that hits a non-finite weight. Use
    /// [`transform_one`](Self::transform_one) to isolate rows.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<FeatureMatrix> {
        let rows = texts
            .iter()
            .map(|t| self.transform_one(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(FeatureMatrix::from_rows(self.n_features(), rows))
    }

    /// Transform for a state that was just fitted, whose weights are all finite.
    pub(crate) fn transform_fitted<S: AsRef<str>>(&self, texts: &[S]) -> FeatureMatrix {
        let rows = texts
            .iter()
            .map(|t| self.transform_one(t.as_ref()).unwrap_or_default())
            .collect();
        FeatureMatrix::from_rows(self.n_features(), rows)
    }
}
