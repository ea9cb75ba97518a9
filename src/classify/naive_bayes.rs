//! Multinomial Naive Bayes over TF-IDF features.
//!
//! Class-conditional feature weights with additive (Laplace) smoothing.
//! Fractional feature values are accumulated as-is, so TF-IDF rows work
//! the same way raw counts would. Unlike the linear SVM this family yields
//! a calibrated class probability.

use serde::{Deserialize, Serialize};

use crate::classify::NaiveBayesParams;
use crate::dataset::Label;
use crate::error::{Result, SiftError};
use crate::vectorize::SparseVector;

/// A fitted multinomial Naive Bayes model. Index 0 is ham, index 1 spam,
/// matching [`Label::all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNb {
    class_log_prior: [f64; 2],
    /// Per-feature log conditional probabilities, `[ham, spam]`.
    feature_log_prob: Vec<[f64; 2]>,
    params: NaiveBayesParams,
}

impl MultinomialNb {
    /// Fit on the given rows. Both classes must be present.
    pub fn fit(
        rows: &[&SparseVector],
        labels: &[Label],
        n_features: usize,
        params: &NaiveBayesParams,
    ) -> Result<Self> {
        if rows.is_empty() || rows.len() != labels.len() {
            return Err(SiftError::training(format!(
                "Naive Bayes needs aligned non-empty rows and labels, got {} rows and {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if n_features == 0 {
            return Err(SiftError::training("feature space is empty"));
        }
        if params.alpha <= 0.0 {
            return Err(SiftError::training("smoothing alpha must be positive"));
        }

        let mut class_counts = [0usize; 2];
        let mut feature_counts = vec![[0.0f64; 2]; n_features];
        let mut class_totals = [0.0f64; 2];

        for (row, label) in rows.iter().zip(labels) {
            let class = class_index(*label);
            class_counts[class] += 1;
            for (index, value) in row.iter() {
                feature_counts[index as usize][class] += value;
                class_totals[class] += value;
            }
        }

        if class_counts[0] == 0 || class_counts[1] == 0 {
            return Err(SiftError::training(
                "Naive Bayes requires samples from both classes",
            ));
        }

        let n = rows.len() as f64;
        let class_log_prior = [
            (class_counts[0] as f64 / n).ln(),
            (class_counts[1] as f64 / n).ln(),
        ];

        let alpha = params.alpha;
        let denominators = [
            class_totals[0] + alpha * n_features as f64,
            class_totals[1] + alpha * n_features as f64,
        ];
        let feature_log_prob = feature_counts
            .into_iter()
            .map(|counts| {
                [
                    ((counts[0] + alpha) / denominators[0]).ln(),
                    ((counts[1] + alpha) / denominators[1]).ln(),
                ]
            })
            .collect();

        Ok(Self {
            class_log_prior,
            feature_log_prob,
            params: params.clone(),
        })
    }

    /// Unnormalized log joint likelihood per class.
    fn joint_log_likelihood(&self, row: &SparseVector) -> [f64; 2] {
        let mut joint = self.class_log_prior;
        for (index, value) in row.iter() {
            if let Some(log_prob) = self.feature_log_prob.get(index as usize) {
                joint[0] += value * log_prob[0];
                joint[1] += value * log_prob[1];
            }
        }
        joint
    }

    /// Predict the label for one row. Exact ties resolve to ham.
    pub fn predict(&self, row: &SparseVector) -> Label {
        let joint = self.joint_log_likelihood(row);
        if joint[1] > joint[0] {
            Label::Spam
        } else {
            Label::Ham
        }
    }

    /// Probability of the predicted (majority) class, in `[0.5, 1]` for a
    /// binary model.
    pub fn max_class_probability(&self, row: &SparseVector) -> f64 {
        let joint = self.joint_log_likelihood(row);
        let max = joint[0].max(joint[1]);
        let exp0 = (joint[0] - max).exp();
        let exp1 = (joint[1] - max).exp();
        exp0.max(exp1) / (exp0 + exp1)
    }

    /// The hyperparameters this model was fitted with.
    pub fn params(&self) -> &NaiveBayesParams {
        &self.params
    }
}

fn class_index(label: Label) -> usize {
    match label {
        Label::Ham => 0,
        Label::Spam => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorize::TfIdfVectorizer;

    fn toy_problem() -> (TfIdfVectorizer, Vec<SparseVector>, Vec<Label>) {
        let texts: Vec<String> = vec![
            "free cash prize now",
            "win free money today",
            "claim prize cash now",
            "meeting notes attached",
            "lunch tomorrow at noon",
            "thanks see you later",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let labels = vec![
            Label::Spam,
            Label::Spam,
            Label::Spam,
            Label::Ham,
            Label::Ham,
            Label::Ham,
        ];
        let mut vectorizer = TfIdfVectorizer::new(40_000, (1, 2));
        vectorizer.fit(&texts).unwrap();
        let rows = vectorizer.transform(&texts).unwrap();
        (vectorizer, rows, labels)
    }

    #[test]
    fn test_fit_and_predict() {
        let (vectorizer, rows, labels) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = NaiveBayesParams { alpha: 0.1 };
        let model =
            MultinomialNb::fit(&refs, &labels, vectorizer.vocabulary_size(), &params).unwrap();

        for (row, label) in rows.iter().zip(&labels) {
            assert_eq!(model.predict(row), *label);
        }
    }

    #[test]
    fn test_probability_bounds() {
        let (vectorizer, rows, labels) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = NaiveBayesParams { alpha: 1.0 };
        let model =
            MultinomialNb::fit(&refs, &labels, vectorizer.vocabulary_size(), &params).unwrap();

        for row in &rows {
            let p = model.max_class_probability(row);
            assert!((0.5..=1.0).contains(&p), "probability {p} out of range");
        }

        // The empty row falls back to the class priors; both classes are
        // equally sized here, so the probability sits at the floor.
        let p = model.max_class_probability(&SparseVector::empty());
        assert!((p - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_rejected() {
        let (vectorizer, rows, _) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let labels = vec![Label::Spam; rows.len()];
        let params = NaiveBayesParams { alpha: 1.0 };
        assert!(
            MultinomialNb::fit(&refs, &labels, vectorizer.vocabulary_size(), &params).is_err()
        );
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        let (vectorizer, rows, labels) = toy_problem();
        let refs: Vec<&SparseVector> = rows.iter().collect();
        let params = NaiveBayesParams { alpha: 0.0 };
        assert!(
            MultinomialNb::fit(&refs, &labels, vectorizer.vocabulary_size(), &params).is_err()
        );
    }
}
