//! Training configuration.
//!
//! All knobs that shape a training run live in [`TrainingConfig`] and are
//! passed explicitly into the trainer and model selector. Two runs with
//! different configurations can coexist in one process.

use serde::{Deserialize, Serialize};

use crate::classify::{CandidateGrid, HingeLoss};
use crate::error::{Result, SiftError};

/// How numeric labels in a raw dataset map onto the canonical
/// `spam`/`ham` labels.
///
/// Upstream datasets disagree on whether `1` means spam; the mapping is
/// therefore explicit rather than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericLabelConvention {
    /// `"1"` is spam, `"0"` is ham (the common convention, default).
    OneIsSpam,
    /// `"0"` is spam, `"1"` is ham.
    ZeroIsSpam,
}

/// Configuration for a single training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Vocabulary ceiling for the TF-IDF vectorizer.
    pub max_features: usize,
    /// Inclusive n-gram range, e.g. `(1, 2)` for unigrams and bigrams.
    pub ngram_range: (usize, usize),
    /// Fraction of the cleaned dataset held out for final evaluation.
    pub test_size: f64,
    /// Number of stratified cross-validation folds.
    pub cv_folds: usize,
    /// Seed for every shuffle in the run (splits, folds, SGD epochs).
    pub seed: u64,
    /// SGD epochs for the linear SVM trainer.
    pub sgd_epochs: usize,
    /// Mapping applied to numeric labels during cleaning.
    pub numeric_labels: NumericLabelConvention,
    /// Candidate hyperparameter grids, in preference order.
    pub grids: Vec<CandidateGrid>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_features: 40_000,
            ngram_range: (1, 2),
            test_size: 0.15,
            cv_folds: 3,
            seed: 42,
            sgd_epochs: 30,
            numeric_labels: NumericLabelConvention::OneIsSpam,
            grids: vec![CandidateGrid::LinearSvc {
                c: vec![0.1, 0.5, 1.0, 5.0],
                loss: vec![HingeLoss::Hinge, HingeLoss::SquaredHinge],
            }],
        }
    }
}

impl TrainingConfig {
    /// Add the Naive Bayes candidate family with its default alpha grid.
    pub fn with_naive_bayes(mut self) -> Self {
        self.grids.push(CandidateGrid::NaiveBayes {
            alpha: vec![0.01, 0.05, 0.1, 0.5, 1.0],
        });
        self
    }

    /// Check the configuration for values that would make a training run
    /// meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(SiftError::validation("max_features must be at least 1"));
        }
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(SiftError::validation(format!(
                "invalid ngram_range ({lo}, {hi}): bounds must satisfy 1 <= min <= max"
            )));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(SiftError::validation(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(SiftError::validation("cv_folds must be at least 2"));
        }
        if self.sgd_epochs == 0 {
            return Err(SiftError::validation("sgd_epochs must be at least 1"));
        }
        if self.grids.is_empty() {
            return Err(SiftError::validation(
                "at least one candidate grid is required",
            ));
        }
        Ok(())
    }
}
