//! Binary text classifiers over TF-IDF features.
//!
//! Two candidate families are implemented: a linear large-margin
//! classifier ([`linear_svc::LinearSvc`], the default) and multinomial
//! Naive Bayes ([`naive_bayes::MultinomialNb`]). A fitted model is carried
//! as a [`TrainedClassifier`], which is what the artifact store persists
//! and the inference service runs.
//!
//! Calibrated confidence is an explicit capability:
//! [`TrainedClassifier::probability`] returns `None` for models that only
//! expose a decision margin, and callers branch on that rather than on a
//! failure path.

pub mod linear_svc;
pub mod naive_bayes;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::Label;
use crate::error::Result;
use crate::vectorize::SparseVector;

pub use linear_svc::LinearSvc;
pub use naive_bayes::MultinomialNb;

/// Loss function for the linear SVM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HingeLoss {
    Hinge,
    SquaredHinge,
}

impl fmt::Display for HingeLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HingeLoss::Hinge => f.write_str("hinge"),
            HingeLoss::SquaredHinge => f.write_str("squared_hinge"),
        }
    }
}

/// Hyperparameters for one linear SVM candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvcParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub loss: HingeLoss,
}

/// Hyperparameters for one Naive Bayes candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesParams {
    /// Additive smoothing strength.
    pub alpha: f64,
}

/// A hyperparameter grid for one candidate family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateGrid {
    LinearSvc { c: Vec<f64>, loss: Vec<HingeLoss> },
    NaiveBayes { alpha: Vec<f64> },
}

impl CandidateGrid {
    /// Expand the grid into concrete candidates, in grid order.
    pub fn expand(&self) -> Vec<CandidateParams> {
        match self {
            CandidateGrid::LinearSvc { c, loss } => {
                let mut out = Vec::with_capacity(c.len() * loss.len());
                for &c in c {
                    for &loss in loss {
                        out.push(CandidateParams::LinearSvc(LinearSvcParams { c, loss }));
                    }
                }
                out
            }
            CandidateGrid::NaiveBayes { alpha } => alpha
                .iter()
                .map(|&alpha| CandidateParams::NaiveBayes(NaiveBayesParams { alpha }))
                .collect(),
        }
    }
}

/// One concrete classifier configuration from a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CandidateParams {
    LinearSvc(LinearSvcParams),
    NaiveBayes(NaiveBayesParams),
}

impl CandidateParams {
    /// Human-readable family name, reported in training summaries.
    pub fn model_type(&self) -> &'static str {
        match self {
            CandidateParams::LinearSvc(_) => "LinearSvc",
            CandidateParams::NaiveBayes(_) => "MultinomialNb",
        }
    }

    /// Rank used to break cross-validation ties: lower means simpler and
    /// faster to evaluate, and wins the tie.
    pub fn complexity_rank(&self) -> u8 {
        match self {
            CandidateParams::NaiveBayes(_) => 0,
            CandidateParams::LinearSvc(_) => 1,
        }
    }

    /// The chosen hyperparameters as a name→value mapping.
    pub fn describe(&self) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        match self {
            CandidateParams::LinearSvc(p) => {
                map.insert("C".to_string(), Value::from(p.c));
                map.insert("loss".to_string(), Value::from(p.loss.to_string()));
            }
            CandidateParams::NaiveBayes(p) => {
                map.insert("alpha".to_string(), Value::from(p.alpha));
            }
        }
        map
    }

    /// Fit this candidate on the given rows.
    pub fn fit(
        &self,
        rows: &[&SparseVector],
        labels: &[Label],
        n_features: usize,
        seed: u64,
        sgd_epochs: usize,
    ) -> Result<TrainedClassifier> {
        match self {
            CandidateParams::LinearSvc(params) => Ok(TrainedClassifier::LinearSvc(
                LinearSvc::fit(rows, labels, n_features, params, seed, sgd_epochs)?,
            )),
            CandidateParams::NaiveBayes(params) => Ok(TrainedClassifier::NaiveBayes(
                MultinomialNb::fit(rows, labels, n_features, params)?,
            )),
        }
    }
}

/// A fitted classifier of any supported family. This is the unit the
/// artifact store persists together with its vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedClassifier {
    LinearSvc(LinearSvc),
    NaiveBayes(MultinomialNb),
}

impl TrainedClassifier {
    /// Predict the label for one feature vector.
    pub fn predict(&self, row: &SparseVector) -> Label {
        match self {
            TrainedClassifier::LinearSvc(model) => model.predict(row),
            TrainedClassifier::NaiveBayes(model) => model.predict(row),
        }
    }

    /// Predict labels for a batch of feature vectors, preserving order.
    pub fn predict_batch(&self, rows: &[SparseVector]) -> Vec<Label> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Calibrated confidence for the predicted class, if this family
    /// supports probabilistic output. The linear SVM exposes only a
    /// decision margin and returns `None`.
    pub fn probability(&self, row: &SparseVector) -> Option<f64> {
        match self {
            TrainedClassifier::LinearSvc(_) => None,
            TrainedClassifier::NaiveBayes(model) => Some(model.max_class_probability(row)),
        }
    }

    /// Capability query: does this classifier expose calibrated
    /// confidence?
    pub fn supports_probability(&self) -> bool {
        matches!(self, TrainedClassifier::NaiveBayes(_))
    }

    /// Family name of the fitted model.
    pub fn model_type(&self) -> &'static str {
        match self {
            TrainedClassifier::LinearSvc(_) => "LinearSvc",
            TrainedClassifier::NaiveBayes(_) => "MultinomialNb",
        }
    }
}
