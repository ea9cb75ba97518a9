//! Persistence of fitted model artifacts.
//!
//! A training run produces a vectorizer/classifier pair. The pair is the
//! unit of persistence and replacement: a classifier fitted against one
//! vocabulary is meaningless against another, so the two blobs are always
//! written and read together. Blobs live at fixed, well-known names inside
//! the model directory, alongside a JSON summary of the producing run.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::classify::TrainedClassifier;
use crate::error::{Result, SiftError};
use crate::trainer::TrainingSummary;
use crate::vectorize::TfIdfVectorizer;

const VECTORIZER_FILE: &str = "vectorizer.bin";
const CLASSIFIER_FILE: &str = "classifier.bin";
const METADATA_FILE: &str = "metadata.json";

/// Reads and writes the persisted artifact pair under a model directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`. The directory is created lazily on
    /// the first save.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The model directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Well-known path of the vectorizer blob.
    pub fn vectorizer_path(&self) -> PathBuf {
        self.dir.join(VECTORIZER_FILE)
    }

    /// Well-known path of the classifier blob.
    pub fn classifier_path(&self) -> PathBuf {
        self.dir.join(CLASSIFIER_FILE)
    }

    /// Well-known path of the training-summary sidecar.
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// True if both artifact blobs are present.
    pub fn exists(&self) -> bool {
        self.vectorizer_path().exists() && self.classifier_path().exists()
    }

    /// Persist a fitted pair. Each blob is written to a temporary sibling
    /// and renamed into place, and both temporaries are written before
    /// either rename, so a crash cannot leave a half-written blob at a
    /// well-known name.
    pub fn save(&self, vectorizer: &TfIdfVectorizer, classifier: &TrainedClassifier) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let vectorizer_bytes = bincode::serialize(vectorizer)?;
        let classifier_bytes = bincode::serialize(classifier)?;

        let vectorizer_tmp = self.dir.join(format!("{VECTORIZER_FILE}.tmp"));
        let classifier_tmp = self.dir.join(format!("{CLASSIFIER_FILE}.tmp"));
        fs::write(&vectorizer_tmp, &vectorizer_bytes)?;
        fs::write(&classifier_tmp, &classifier_bytes)?;

        fs::rename(&vectorizer_tmp, self.vectorizer_path())?;
        fs::rename(&classifier_tmp, self.classifier_path())?;

        debug!(
            "saved artifacts to {} ({} + {} bytes)",
            self.dir.display(),
            vectorizer_bytes.len(),
            classifier_bytes.len()
        );
        Ok(())
    }

    /// Load the persisted pair. Fails with a distinguishable
    /// [`SiftError::ArtifactNotFound`] when either blob is missing, which
    /// is an expected state on a fresh deployment.
    pub fn load(&self) -> Result<(TfIdfVectorizer, TrainedClassifier)> {
        let vectorizer_path = self.vectorizer_path();
        let classifier_path = self.classifier_path();

        if !vectorizer_path.exists() {
            return Err(SiftError::artifact_not_found(&vectorizer_path));
        }
        if !classifier_path.exists() {
            return Err(SiftError::artifact_not_found(&classifier_path));
        }

        let vectorizer: TfIdfVectorizer = bincode::deserialize(&fs::read(&vectorizer_path)?)?;
        let classifier: TrainedClassifier = bincode::deserialize(&fs::read(&classifier_path)?)?;
        Ok((vectorizer, classifier))
    }

    /// Write the training-summary sidecar.
    pub fn save_metadata(&self, summary: &TrainingSummary) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(summary)?;
        fs::write(self.metadata_path(), json)?;
        Ok(())
    }

    /// Read the training-summary sidecar.
    pub fn load_metadata(&self) -> Result<TrainingSummary> {
        let path = self.metadata_path();
        if !path.exists() {
            return Err(SiftError::artifact_not_found(&path));
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{HingeLoss, LinearSvc, LinearSvcParams};
    use crate::dataset::Label;
    use crate::vectorize::SparseVector;

    fn fitted_pair() -> (TfIdfVectorizer, TrainedClassifier, Vec<SparseVector>) {
        let texts: Vec<String> = vec![
            "free cash now",
            "win a prize today",
            "lunch at noon",
            "see you tomorrow",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let labels = vec![Label::Spam, Label::Spam, Label::Ham, Label::Ham];

        let mut vectorizer = TfIdfVectorizer::new(1000, (1, 2));
        vectorizer.fit(&texts).unwrap();
        let rows = vectorizer.transform(&texts).unwrap();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = LinearSvcParams {
            c: 1.0,
            loss: HingeLoss::Hinge,
        };
        let model =
            LinearSvc::fit(&refs, &labels, vectorizer.vocabulary_size(), &params, 42, 20).unwrap();
        (vectorizer, TrainedClassifier::LinearSvc(model), rows)
    }

    #[test]
    fn test_save_load_round_trip_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (vectorizer, classifier, probe_rows) = fitted_pair();

        assert!(!store.exists());
        store.save(&vectorizer, &classifier).unwrap();
        assert!(store.exists());

        let (loaded_vectorizer, loaded_classifier) = store.load().unwrap();
        assert_eq!(
            loaded_vectorizer.vocabulary_size(),
            vectorizer.vocabulary_size()
        );
        for row in &probe_rows {
            assert_eq!(loaded_classifier.predict(row), classifier.predict(row));
        }

        // Re-vectorizing a probe message through the loaded vectorizer
        // must agree with the original end to end.
        let probe = vec!["free cash prize at noon".to_string()];
        let original = vectorizer.transform(&probe).unwrap();
        let reloaded = loaded_vectorizer.transform(&probe).unwrap();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_load_missing_is_artifact_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("empty"));
        let err = store.load().unwrap_err();
        assert!(err.is_artifact_not_found());
    }

    #[test]
    fn test_load_with_one_blob_missing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let (vectorizer, classifier, _) = fitted_pair();
        store.save(&vectorizer, &classifier).unwrap();

        fs::remove_file(store.classifier_path()).unwrap();
        let err = store.load().unwrap_err();
        assert!(err.is_artifact_not_found());
        assert!(err.to_string().contains("classifier.bin"));
    }
}
