//! Linear large-margin classifier trained with stochastic gradient
//! descent.
//!
//! Minimizes the L2-regularized hinge (or squared-hinge) loss with a
//! decaying step size, `lambda = 1 / (C * n_samples)`. The intercept is
//! left unregularized. Sample order is reshuffled every epoch from a
//! seeded generator, so a fit with the same data, parameters, and seed is
//! reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::classify::{HingeLoss, LinearSvcParams};
use crate::dataset::Label;
use crate::error::{Result, SiftError};
use crate::vectorize::SparseVector;

/// Base step size for the decaying SGD schedule.
const ETA0: f64 = 1.0;

/// A fitted linear SVM: dense weight vector plus intercept over the
/// vectorizer's feature space. Spam is the positive class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    weights: Vec<f64>,
    bias: f64,
    params: LinearSvcParams,
}

impl LinearSvc {
    /// Fit on the given rows. `n_features` is the vectorizer's feature
    /// space size; every row index must fall inside it.
    pub fn fit(
        rows: &[&SparseVector],
        labels: &[Label],
        n_features: usize,
        params: &LinearSvcParams,
        seed: u64,
        epochs: usize,
    ) -> Result<Self> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(SiftError::training(format!(
                "linear SVM needs aligned non-empty rows and labels, got {} rows and {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if n_features == 0 {
            return Err(SiftError::training("feature space is empty"));
        }

        let n = rows.len();
        let lambda = 1.0 / (params.c * n as f64);
        let targets: Vec<f64> = labels
            .iter()
            .map(|label| match label {
                Label::Spam => 1.0,
                Label::Ham => -1.0,
            })
            .collect();

        // The weight vector is kept as `scale * weights` so the per-step L2
        // shrinkage is a single scalar multiply instead of an
        // O(n_features) sweep.
        let mut weights = vec![0.0; n_features];
        let mut scale = 1.0f64;
        let mut bias = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut step: u64 = 0;

        for _ in 0..epochs {
            order.shuffle(&mut rng);
            for &i in &order {
                step += 1;
                let eta = ETA0 / (1.0 + ETA0 * lambda * step as f64);
                let y = targets[i];
                let x = rows[i];
                let margin = y * (scale * x.dot_dense(&weights) + bias);

                // L2 shrinkage on the weights only. `eta * lambda < 1`
                // under the decaying schedule, so the factor stays in
                // (0, 1).
                scale *= 1.0 - eta * lambda;
                if scale < 1e-9 {
                    for w in &mut weights {
                        *w *= scale;
                    }
                    scale = 1.0;
                }

                let pull = match params.loss {
                    HingeLoss::Hinge => {
                        if margin < 1.0 {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    HingeLoss::SquaredHinge => {
                        if margin < 1.0 {
                            2.0 * (1.0 - margin)
                        } else {
                            0.0
                        }
                    }
                };

                if pull > 0.0 {
                    let step_size = eta * pull * y;
                    for (index, value) in x.iter() {
                        weights[index as usize] += step_size * value / scale;
                    }
                    bias += step_size;
                }
            }
        }

        for w in &mut weights {
            *w *= scale;
        }

        Ok(Self {
            weights,
            bias,
            params: params.clone(),
        })
    }

    /// Signed distance from the separating hyperplane; positive means
    /// spam.
    pub fn decision(&self, row: &SparseVector) -> f64 {
        row.dot_dense(&self.weights) + self.bias
    }

    /// Predict the label for one row. A zero margin resolves to ham.
    pub fn predict(&self, row: &SparseVector) -> Label {
        if self.decision(row) > 0.0 {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    /// The hyperparameters this model was fitted with.
    pub fn params(&self) -> &LinearSvcParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::TfIdfVectorizer;

    fn toy_problem() -> (Vec<SparseVector>, Vec<Label>, usize) {
        let texts: Vec<String> = vec![
            "win cash prize now",
            "free cash offer click",
            "claim your free prize",
            "win big money now",
            "lunch at noon tomorrow",
            "see you at the meeting",
            "thanks for the notes",
            "are we still on for lunch",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let labels = vec![
            Label::Spam,
            Label::Spam,
            Label::Spam,
            Label::Spam,
            Label::Ham,
            Label::Ham,
            Label::Ham,
            Label::Ham,
        ];
        let mut vectorizer = TfIdfVectorizer::new(40_000, (1, 2));
        vectorizer.fit(&texts).unwrap();
        let rows = vectorizer.transform(&texts).unwrap();
        let n_features = vectorizer.vocabulary_size();
        (rows, labels, n_features)
    }

    #[test]
    fn test_fit_separates_training_data() {
        let (rows, labels, n_features) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        for loss in [HingeLoss::Hinge, HingeLoss::SquaredHinge] {
            let params = LinearSvcParams { c: 1.0, loss };
            let model = LinearSvc::fit(&refs, &labels, n_features, &params, 42, 30).unwrap();
            for (row, label) in rows.iter().zip(&labels) {
                assert_eq!(model.predict(row), *label, "loss={loss}");
            }
        }
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (rows, labels, n_features) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = LinearSvcParams {
            c: 0.5,
            loss: HingeLoss::Hinge,
        };
        let a = LinearSvc::fit(&refs, &labels, n_features, &params, 7, 20).unwrap();
        let b = LinearSvc::fit(&refs, &labels, n_features, &params, 7, 20).unwrap();
        for row in &rows {
            assert_eq!(a.decision(row), b.decision(row));
        }
    }

    #[test]
    fn test_long_runs_fold_shrinkage_correctly() {
        // Many epochs drive the deferred shrinkage factor far below 1;
        // the fitted weights must still be finite and separate the
        // training data once the factor is folded in.
        let (rows, labels, n_features) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = LinearSvcParams {
            c: 1.0,
            loss: HingeLoss::Hinge,
        };
        let model = LinearSvc::fit(&refs, &labels, n_features, &params, 42, 300).unwrap();
        for (row, label) in rows.iter().zip(&labels) {
            assert!(model.decision(row).is_finite());
            assert_eq!(model.predict(row), *label);
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let params = LinearSvcParams {
            c: 1.0,
            loss: HingeLoss::Hinge,
        };
        assert!(LinearSvc::fit(&[], &[], 10, &params, 42, 10).is_err());
    }

    #[test]
    fn test_zero_vector_predicts_ham_on_balanced_data() {
        let (rows, labels, n_features) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = LinearSvcParams {
            c: 1.0,
            loss: HingeLoss::Hinge,
        };
        let model = LinearSvc::fit(&refs, &labels, n_features, &params, 42, 30).unwrap();
        // A message with no known terms lands on the intercept alone;
        // it must still produce a definite label.
        let label = model.predict(&SparseVector::empty());
        assert!(matches!(label, Label::Ham | Label::Spam));
    }
}
