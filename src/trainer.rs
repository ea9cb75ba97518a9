//! Training orchestration.
//!
//! [`train_and_persist`] drives the full retraining flow: clean the raw
//! dataset, fit the vectorizer on the training split, run model selection,
//! and persist the winning pair plus a summary sidecar. It never touches
//! the in-process model state — the service reloads from the freshly
//! persisted artifacts so that training and serving consume the exact same
//! bytes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::artifacts::ArtifactStore;
use crate::config::TrainingConfig;
use crate::dataset::{Dataset, Label};
use crate::error::{Result, SiftError};
use crate::selection::{select_and_evaluate, stratified_train_test_split};
use crate::vectorize::TfIdfVectorizer;

/// Structured summary of a completed training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Accuracy on the held-out test split.
    pub accuracy: f64,
    /// Mean cross-validated accuracy of the chosen candidate.
    pub cv_accuracy: f64,
    /// Usable rows after cleaning.
    pub total_samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Family name of the chosen model.
    pub model_type: String,
    /// Chosen hyperparameters.
    pub best_params: HashMap<String, Value>,
    /// Per-class precision/recall/F1 report on the test split.
    pub report: String,
    pub trained_at: DateTime<Utc>,
}

/// Train on a raw dataset and persist the fitted pair through `store`.
///
/// Fails without touching the store when the dataset is degenerate (no
/// usable rows, a single class, or a class smaller than the
/// cross-validation fold count).
pub fn train_and_persist(
    dataset: &Dataset,
    config: &TrainingConfig,
    store: &ArtifactStore,
) -> Result<TrainingSummary> {
    config.validate()?;

    let clean = dataset.clean(config.numeric_labels);
    if clean.is_empty() {
        return Err(SiftError::validation(
            "no usable rows remain after cleaning; check the 'text' and 'label' values",
        ));
    }
    clean.ensure_two_classes()?;

    let [ham, spam] = clean.class_counts();
    info!(
        "training on {} cleaned samples ({ham} ham, {spam} spam) of {} raw rows",
        clean.len(),
        dataset.len()
    );

    let (train_idx, test_idx) =
        stratified_train_test_split(&clean.labels, config.test_size, config.seed)?;
    let train_texts: Vec<String> = train_idx.iter().map(|&i| clean.texts[i].clone()).collect();
    let y_train: Vec<Label> = train_idx.iter().map(|&i| clean.labels[i]).collect();
    let test_texts: Vec<String> = test_idx.iter().map(|&i| clean.texts[i].clone()).collect();
    let y_test: Vec<Label> = test_idx.iter().map(|&i| clean.labels[i]).collect();

    // The vectorizer is fitted exactly once, on the training split only.
    let mut vectorizer = TfIdfVectorizer::new(config.max_features, config.ngram_range);
    vectorizer.fit(&train_texts)?;
    let x_train = vectorizer.transform(&train_texts)?;
    let x_test = vectorizer.transform(&test_texts)?;
    info!(
        "vectorized {} train / {} test rows over {} features",
        x_train.len(),
        x_test.len(),
        vectorizer.vocabulary_size()
    );

    let outcome = select_and_evaluate(
        &x_train,
        &y_train,
        &x_test,
        &y_test,
        vectorizer.vocabulary_size(),
        config,
    )?;
    info!(
        "test accuracy {:.4} with {}\n{}",
        outcome.test_accuracy, outcome.model_type, outcome.report
    );

    store.save(&vectorizer, &outcome.classifier)?;

    let summary = TrainingSummary {
        accuracy: outcome.test_accuracy,
        cv_accuracy: outcome.cv_accuracy,
        total_samples: clean.len(),
        train_samples: train_idx.len(),
        test_samples: test_idx.len(),
        model_type: outcome.model_type.to_string(),
        best_params: outcome.best_params,
        report: outcome.report,
        trained_at: Utc::now(),
    };
    store.save_metadata(&summary)?;

    Ok(summary)
}
