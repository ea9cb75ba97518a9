//! Inference service and process-wide model state.
//!
//! [`ModelState`] owns the currently active vectorizer/classifier pair
//! behind a read-write lock holding an `Arc` snapshot. Readers clone the
//! `Arc` and release the lock before doing any work, so an in-flight
//! prediction always sees a complete pair from a single training
//! generation — the swap after a reload is atomic from the caller's
//! perspective. Retraining is exclusive: a second run started while one is
//! in flight is rejected.

use std::sync::Arc;

use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactStore;
use crate::classify::TrainedClassifier;
use crate::config::TrainingConfig;
use crate::dataset::Dataset;
use crate::error::{Result, SiftError};
use crate::trainer::{TrainingSummary, train_and_persist};
use crate::vectorize::TfIdfVectorizer;

/// The caller-facing binary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Spam,
    Ham,
}

impl Decision {
    /// Map a classifier's raw label output onto the decision.
    ///
    /// This is the single place the mapping lives: `1`, `"1"`, and
    /// `"spam"` (ignoring case and surrounding whitespace) mean SPAM,
    /// everything else means HAM.
    pub fn from_raw_label(raw: &str) -> Decision {
        match raw.trim().to_lowercase().as_str() {
            "1" | "spam" => Decision::Spam,
            _ => Decision::Ham,
        }
    }

    /// Caller-facing string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Spam => "SPAM",
            Decision::Ham => "HAM",
        }
    }
}

/// One classified message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: Decision,
    /// The classifier's confidence in its decision, in `[0, 1]`. Models
    /// without calibrated probabilities report `0.0`.
    pub probability: f64,
    /// The input message, echoed verbatim.
    pub original_message: String,
}

/// A complete artifact pair from one training generation.
#[derive(Debug)]
struct ModelPair {
    vectorizer: TfIdfVectorizer,
    classifier: TrainedClassifier,
}

/// Process-wide model state: at most one active pair, swapped wholesale.
#[derive(Debug)]
pub struct ModelState {
    store: ArtifactStore,
    active: RwLock<Option<Arc<ModelPair>>>,
    train_gate: Mutex<()>,
}

impl ModelState {
    /// Create the state in the Unloaded condition, without touching disk.
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            active: RwLock::new(None),
            train_gate: Mutex::new(()),
        }
    }

    /// Create the state and attempt to load persisted artifacts, the
    /// process-start behavior. Absent artifacts leave the state Unloaded
    /// with a warning; any other load failure is an error.
    pub fn open(store: ArtifactStore) -> Result<Self> {
        let state = Self::new(store);
        match state.reload() {
            Ok(()) => info!("loaded model artifacts from {}", state.store.dir().display()),
            Err(e) if e.is_artifact_not_found() => {
                warn!("{e}; starting unloaded, run training first");
            }
            Err(e) => return Err(e),
        }
        Ok(state)
    }

    /// The artifact store backing this state.
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// True if a pair is loaded and inference can run.
    pub fn is_ready(&self) -> bool {
        self.active.read().is_some()
    }

    /// Load the persisted pair and swap it in. The swap is wholesale: a
    /// failed load leaves the previously active pair in place, and
    /// concurrent readers see either the old or the new pair, never a
    /// mixture.
    pub fn reload(&self) -> Result<()> {
        let (vectorizer, classifier) = self.store.load()?;
        let pair = Arc::new(ModelPair {
            vectorizer,
            classifier,
        });
        *self.active.write() = Some(pair);
        Ok(())
    }

    /// Classify a single message.
    pub fn predict_one(&self, message: &str) -> Result<Prediction> {
        let messages = [message.to_string()];
        let results = self.predict_messages(&messages)?;
        Ok(results.into_iter().next().expect("one input, one output"))
    }

    /// Classify a batch of messages in one vectorized pass, preserving
    /// input order. A batch of one is numerically identical to
    /// [`predict_one`](Self::predict_one).
    pub fn predict_batch(&self, messages: &[String]) -> Result<Vec<Prediction>> {
        if messages.is_empty() {
            return Err(SiftError::validation(
                "batch prediction requires at least one message",
            ));
        }
        self.predict_messages(messages)
    }

    fn predict_messages(&self, messages: &[String]) -> Result<Vec<Prediction>> {
        for message in messages {
            if message.trim().is_empty() {
                return Err(SiftError::validation("message must not be empty"));
            }
        }

        let pair = self.snapshot()?;

        let normalized: Vec<String> = messages
            .iter()
            .map(|message| crate::analysis::normalize(message))
            .collect();
        let rows = pair.vectorizer.transform(&normalized)?;

        let mut predictions = Vec::with_capacity(messages.len());
        for (row, message) in rows.iter().zip(messages) {
            let label = pair.classifier.predict(row);
            let probability = pair.classifier.probability(row).unwrap_or(0.0);
            predictions.push(Prediction {
                prediction: Decision::from_raw_label(label.as_str()),
                probability,
                original_message: message.clone(),
            });
        }
        Ok(predictions)
    }

    /// Retrain from a raw dataset, persist the new pair, and reload it
    /// from disk (never from the in-memory training objects).
    ///
    /// At most one training run may be in flight; a concurrent call is
    /// rejected. A failed run leaves both the active pair and the on-disk
    /// artifacts of the previous run untouched.
    pub fn train(&self, dataset: &Dataset, config: &TrainingConfig) -> Result<TrainingSummary> {
        let Some(_guard) = self.train_gate.try_lock() else {
            return Err(SiftError::training(
                "another training run is already in progress",
            ));
        };

        let summary = train_and_persist(dataset, config, &self.store)?;

        // Serve exactly the persisted bytes. A failure here is a storage
        // bug, not an expected fresh-deployment state.
        self.reload()?;
        info!(
            "model reloaded: {} (test accuracy {:.4})",
            summary.model_type, summary.accuracy
        );
        Ok(summary)
    }

    /// Take a snapshot of the active pair, or fail if Unloaded.
    fn snapshot(&self) -> Result<Arc<ModelPair>> {
        self.active.read().clone().ok_or_else(|| {
            SiftError::model_not_loaded(
                "no model artifacts are loaded; run training before requesting predictions",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawRecord;

    fn labeled_corpus() -> Dataset {
        let spam = [
            "WIN a FREE cash prize now!!!",
            "Claim your free prize today http://spam.example",
            "Urgent: you won $1000, click now",
            "Free entry to win cash",
            "Exclusive offer, win money fast",
            "Click here for a free cash reward",
            "You have been selected to win a prize",
            "Limited time cash offer, act now",
            "Win big money today, free entry",
            "Congratulations! Claim your cash prize",
        ];
        let ham = [
            "Are we still on for lunch tomorrow?",
            "See you at the meeting at three",
            "Thanks for sending the notes",
            "Call me when you get home",
            "The report is attached, let me know",
            "Happy birthday! Hope all is well",
            "Running late, see you soon",
            "Can you pick up some milk?",
            "Great catching up yesterday",
            "Meeting moved to Thursday morning",
        ];
        let mut records = Vec::new();
        for text in spam {
            records.push(RawRecord {
                text: text.to_string(),
                label: "spam".to_string(),
            });
        }
        for text in ham {
            records.push(RawRecord {
                text: text.to_string(),
                label: "ham".to_string(),
            });
        }
        Dataset::from_records(records)
    }

    #[test]
    fn test_decision_mapping_is_centralized() {
        assert_eq!(Decision::from_raw_label("spam"), Decision::Spam);
        assert_eq!(Decision::from_raw_label("SPAM"), Decision::Spam);
        assert_eq!(Decision::from_raw_label(" 1 "), Decision::Spam);
        assert_eq!(Decision::from_raw_label("ham"), Decision::Ham);
        assert_eq!(Decision::from_raw_label("0"), Decision::Ham);
        assert_eq!(Decision::from_raw_label("anything else"), Decision::Ham);
    }

    #[test]
    fn test_decision_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Decision::Spam).unwrap(), "\"SPAM\"");
        assert_eq!(serde_json::to_string(&Decision::Ham).unwrap(), "\"HAM\"");
    }

    #[test]
    fn test_unloaded_state_rejects_inference() {
        let dir = tempfile::tempdir().unwrap();
        let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();
        assert!(!state.is_ready());

        let err = state.predict_one("hello there").unwrap_err();
        assert!(matches!(err, SiftError::ModelNotLoaded(_)));
    }

    #[test]
    fn test_train_then_predict() {
        let dir = tempfile::tempdir().unwrap();
        let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();

        let summary = state.train(&labeled_corpus(), &TrainingConfig::default()).unwrap();
        assert!(state.is_ready());
        assert!(summary.accuracy > 0.0 && summary.accuracy <= 1.0);

        let prediction = state.predict_one("hi there, lunch tomorrow?").unwrap();
        assert!((0.0..=1.0).contains(&prediction.probability));
        assert_eq!(prediction.original_message, "hi there, lunch tomorrow?");
    }

    #[test]
    fn test_batch_preserves_order_and_matches_single() {
        let dir = tempfile::tempdir().unwrap();
        let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();
        state.train(&labeled_corpus(), &TrainingConfig::default()).unwrap();

        let messages = vec![
            "hi there".to_string(),
            "WIN $1000 now!!".to_string(),
        ];
        let batch = state.predict_batch(&messages).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].original_message, "hi there");
        assert_eq!(batch[1].original_message, "WIN $1000 now!!");

        for (message, from_batch) in messages.iter().zip(&batch) {
            let single = state.predict_one(message).unwrap();
            assert_eq!(single.prediction, from_batch.prediction);
            assert_eq!(single.probability, from_batch.probability);
        }
    }

    #[test]
    fn test_empty_inputs_are_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();
        state.train(&labeled_corpus(), &TrainingConfig::default()).unwrap();

        assert!(matches!(
            state.predict_one("").unwrap_err(),
            SiftError::Validation(_)
        ));
        assert!(matches!(
            state.predict_one("   ").unwrap_err(),
            SiftError::Validation(_)
        ));
        assert!(matches!(
            state.predict_batch(&[]).unwrap_err(),
            SiftError::Validation(_)
        ));
    }

    #[test]
    fn test_failed_training_keeps_previous_model_active() {
        let dir = tempfile::tempdir().unwrap();
        let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();
        state.train(&labeled_corpus(), &TrainingConfig::default()).unwrap();
        let before = state.predict_one("free cash prize now").unwrap();

        // Single-class dataset: training fails during validation.
        let bad = Dataset::from_records(
            (0..5)
                .map(|i| RawRecord {
                    text: format!("plain message {i}"),
                    label: "ham".to_string(),
                })
                .collect(),
        );
        assert!(state.train(&bad, &TrainingConfig::default()).is_err());

        // The old pair keeps serving, byte for byte.
        let after = state.predict_one("free cash prize now").unwrap();
        assert_eq!(before.prediction, after.prediction);
        assert_eq!(before.probability, after.probability);
    }

    #[test]
    fn test_open_picks_up_persisted_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        {
            let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();
            state.train(&labeled_corpus(), &TrainingConfig::default()).unwrap();
        }

        // A fresh process start sees the artifacts immediately.
        let state = ModelState::open(ArtifactStore::new(dir.path())).unwrap();
        assert!(state.is_ready());
        state.predict_one("claim your free prize").unwrap();
    }
}
