//! Saving and loading the frozen vectorizer.

use std::path::Path;

use tracing::info;

use polarity_types::{ArtifactKind, PolarityError, Result};

use crate::artifact;
use crate::vectorizer::types::{VectorizerState, FORMAT_VERSION};

const KIND: ArtifactKind = ArtifactKind::Vectorizer;

impl VectorizerState {
    /// Serializes the state. Loading the bytes gives back an equal state.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        artifact::encode(KIND, self)
    }

    /// Deserializes and validates a state. `origin` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`PolarityError::ArtifactCorrupt`] if the bytes do not decode or
    /// the decoded vocabulary is malformed.
    pub fn from_bytes(bytes: &[u8], origin: &Path) -> Result<Self> {
        let state: Self = artifact::decode(KIND, origin, bytes)?;
        state.validate().map_err(|reason| PolarityError::ArtifactCorrupt {
            kind: KIND,
            path: origin.to_path_buf(),
            reason,
        })?;
        Ok(state)
    }

    /// Writes the state to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        artifact::write_blob(KIND, path.as_ref(), &self.to_bytes()?)
    }

    /// Reads a state from `path`.
    ///
    /// # Errors
    ///
    /// [`PolarityError::ArtifactNotFound`] if the file is missing,
    /// [`PolarityError::ArtifactCorrupt`] if it cannot be used.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = artifact::read_blob(KIND, path)?;
        let state = Self::from_bytes(&bytes, path)?;
        info!(
            path = %path.display(),
            vocabulary = state.n_features(),
            "loaded vectorizer"
        );
        Ok(state)
    }

    /// Structural checks. Weight values are checked per row at transform time.
    fn validate(&self) -> core::result::Result<(), String> {
        if self.version != FORMAT_VERSION {
            return Err(format!(
                "format version {} (expected {FORMAT_VERSION})",
                self.version
            ));
        }
        if self.terms.len() != self.idf.len() {
            return Err(format!(
                "{} terms but {} weights",
                self.terms.len(),
                self.idf.len()
            ));
        }
        if self.terms.len() > self.config.max_features {
            return Err(format!(
                "{} terms exceed max_features {}",
                self.terms.len(),
                self.config.max_features
            ));
        }
        if let Some(pair) = self.terms.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "vocabulary not strictly sorted at {:?} / {:?}",
                pair[0], pair[1]
            ));
        }
        if self.terms.len() > u32::MAX as usize {
            return Err("vocabulary too large for u32 columns".to_owned());
        }
        Ok(())
    }
}
