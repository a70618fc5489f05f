//! Statistics and VectorizerStats.

use crate::vectorizer::types::VectorizerState;

/// A snapshot of vocabulary statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorizerStats {
    /// Documents the vocabulary was fitted on.
    pub num_documents: usize,
    /// Number of feature columns.
    pub num_terms: usize,
    /// Columns whose term spans more than one token.
    pub num_multiword: usize,
    /// Smallest IDF weight, if any term exists.
    pub min_idf: Option<f64>,
    /// Largest IDF weight, if any term exists.
    pub max_idf: Option<f64>,
}

impl VectorizerState {
    /// Returns vocabulary statistics.
    pub fn stats(&self) -> VectorizerStats {
        VectorizerStats::from_state(self)
    }
}

impl VectorizerStats {
    /// Constructs stats from a fitted state.
    pub fn from_state(state: &VectorizerState) -> Self {
        let finite = state.idf.iter().copied().filter(|w| w.is_finite());
        let (min_idf, max_idf) = finite.fold((None, None), |(lo, hi), w| {
            (
                Some(lo.map_or(w, |l: f64| l.min(w))),
                Some(hi.map_or(w, |h: f64| h.max(w))),
            )
        });

        Self {
            num_documents: state.n_documents,
            num_terms: state.terms.len(),
            num_multiword: state.terms.iter().filter(|t| t.contains(' ')).count(),
            min_idf,
            max_idf,
        }
    }

    /// Share of multi-word terms in the vocabulary, 0.0 when empty.
    pub fn multiword_ratio(&self) -> f64 {
        if self.num_terms == 0 {
            0.0
        } else {
            self.num_multiword as f64 / self.num_terms as f64
        }
    }
}

impl core::fmt::Display for VectorizerStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} docs, {} terms ({:.1}% multi-word)",
            self.num_documents,
            self.num_terms,
            self.multiword_ratio() * 100.0
        )?;

        if let (Some(lo), Some(hi)) = (self.min_idf, self.max_idf) {
            write!(f, ", idf {lo:.3}..{hi:.3}")?;
        }

        Ok(())
    }
}
