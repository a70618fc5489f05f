//! Artifact files.
//!
//! The fitted vectorizer and the trained classifier are each stored as one
//! bincode blob. Reading maps a missing file to
//! [`PolarityError::ArtifactNotFound`] and an undecodable one to
//! [`PolarityError::ArtifactCorrupt`], so callers never see a half-loaded
//! predictor.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use polarity_types::{ArtifactKind, PolarityError, Result};

/// Default file name of the vectorizer artifact.
pub const VECTORIZER_FILE: &str = "vectorizer.bin";
/// Default file name of the classifier artifact.
pub const CLASSIFIER_FILE: &str = "model.bin";

/// Serializes `value` to bytes.
pub fn encode<T: Serialize>(kind: ArtifactKind, value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| PolarityError::ArtifactCorrupt {
        kind,
        path: PathBuf::new(),
        reason: format!("serialization failed: {e}"),
    })
}

/// Deserializes bytes read from `path`.
pub fn decode<T: DeserializeOwned>(kind: ArtifactKind, path: &Path, bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| PolarityError::ArtifactCorrupt {
        kind,
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Reads an artifact file.
pub fn read_blob(kind: ArtifactKind, path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => {
            debug!(%kind, path = %path.display(), bytes = bytes.len(), "read artifact");
            Ok(bytes)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(PolarityError::ArtifactNotFound {
            kind,
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Writes an artifact file, creating parent directories.
pub fn write_blob(kind: ArtifactKind, path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    info!(%kind, path = %path.display(), bytes = bytes.len(), "saved artifact");
    Ok(())
}

/// Locations of the two artifacts a predictor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
}

impl ArtifactPaths {
    pub fn new(vectorizer: impl Into<PathBuf>, classifier: impl Into<PathBuf>) -> Self {
        Self {
            vectorizer: vectorizer.into(),
            classifier: classifier.into(),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(VECTORIZER_FILE), dir.join(CLASSIFIER_FILE))
    }

    /// Checks which artifacts exist, without loading them.
    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            vectorizer: ArtifactStatus::probe(ArtifactKind::Vectorizer, &self.vectorizer),
            classifier: ArtifactStatus::probe(ArtifactKind::Classifier, &self.classifier),
        }
    }
}

/// Presence of a single artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    /// File size, `None` when the file is missing.
    pub size_bytes: Option<u64>,
}

impl ArtifactStatus {
    fn probe(kind: ArtifactKind, path: &Path) -> Self {
        let size_bytes = fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.len());
        Self {
            kind,
            path: path.to_path_buf(),
            size_bytes,
        }
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.size_bytes.is_some()
    }
}

impl core::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.size_bytes {
            Some(size) => write!(f, "{}: {} ({} bytes)", self.kind, self.path.display(), size),
            None => write!(f, "{}: {} (missing)", self.kind, self.path.display()),
        }
    }
}

/// Availability of the vectorizer and classifier artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub vectorizer: ArtifactStatus,
    pub classifier: ArtifactStatus,
}

impl ModelStatus {
    /// Both artifacts are present.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.vectorizer.exists() && self.classifier.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.bin");
        let err = read_blob(ArtifactKind::Vectorizer, &path).unwrap_err();
        match err {
            PolarityError::ArtifactNotFound { kind, path: p } => {
                assert_eq!(kind, ArtifactKind::Vectorizer);
                assert_eq!(p, path);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("blob.bin");
        write_blob(ArtifactKind::Classifier, &path, b"abc").unwrap();
        assert_eq!(read_blob(ArtifactKind::Classifier, &path).unwrap(), b"abc");
    }

    #[test]
    fn garbage_is_corrupt() {
        let path = Path::new("garbage.bin");
        let err = decode::<Vec<String>>(ArtifactKind::Vectorizer, path, &[0xFF; 3]).unwrap_err();
        assert!(matches!(err, PolarityError::ArtifactCorrupt { .. }));
        assert!(err.to_string().contains("garbage.bin"));
    }

    #[test]
    fn encode_decode_value() {
        let value = vec![String::from("great"), String::from("work")];
        let bytes = encode(ArtifactKind::Vectorizer, &value).unwrap();
        let back: Vec<String> = decode(ArtifactKind::Vectorizer, Path::new("x"), &bytes).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn status_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());

        let status = paths.status();
        assert!(!status.is_ready());
        assert!(!status.vectorizer.exists());
        assert!(status.classifier.to_string().contains("missing"));

        fs::write(&paths.vectorizer, [1u8, 2, 3]).unwrap();
        fs::write(&paths.classifier, [1u8]).unwrap();

        let status = paths.status();
        assert!(status.is_ready());
        assert_eq!(status.vectorizer.size_bytes, Some(3));
        assert_eq!(status.classifier.size_bytes, Some(1));
    }

    #[test]
    fn default_file_names() {
        let paths = ArtifactPaths::in_dir("models");
        assert_eq!(paths.vectorizer, Path::new("models").join("vectorizer.bin"));
        assert_eq!(paths.classifier, Path::new("models").join("model.bin"));
    }
}
