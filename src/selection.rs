//! Model selection: stratified splitting, cross-validated grid search, and
//! held-out evaluation.
//!
//! Candidates are scored by mean accuracy over stratified k-fold
//! cross-validation of the (already vectorized) training split. The winner
//! is refit on the whole training split and evaluated once on the
//! untouched test split. Candidate scoring is embarrassingly parallel and
//! runs on the rayon pool.

use std::collections::HashMap;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde_json::Value;

use crate::classify::{CandidateParams, TrainedClassifier};
use crate::config::TrainingConfig;
use crate::dataset::Label;
use crate::error::{Result, SiftError};
use crate::vectorize::SparseVector;

/// The result of a full selection run.
#[derive(Debug)]
pub struct SelectionOutcome {
    /// Best candidate, refit on the full training split.
    pub classifier: TrainedClassifier,
    /// Family name of the winner.
    pub model_type: &'static str,
    /// Hyperparameters of the winner.
    pub best_params: HashMap<String, Value>,
    /// Mean cross-validated accuracy of the winner.
    pub cv_accuracy: f64,
    /// Accuracy on the held-out test split.
    pub test_accuracy: f64,
    /// Human-readable per-class precision/recall/F1 report for the test
    /// split.
    pub report: String,
}

/// Run the cross-validated grid search over the vectorized training split,
/// refit the winner, and evaluate it on the held-out test split.
pub fn select_and_evaluate(
    x_train: &[SparseVector],
    y_train: &[Label],
    x_test: &[SparseVector],
    y_test: &[Label],
    n_features: usize,
    config: &TrainingConfig,
) -> Result<SelectionOutcome> {
    let candidates: Vec<CandidateParams> =
        config.grids.iter().flat_map(|grid| grid.expand()).collect();
    if candidates.is_empty() {
        return Err(SiftError::validation("candidate grids expand to nothing"));
    }

    let folds = stratified_folds(y_train, config.cv_folds, config.seed)?;
    info!(
        "grid search: {} candidates, {}-fold cross-validation over {} samples",
        candidates.len(),
        folds.len(),
        x_train.len()
    );

    let scores: Vec<Result<f64>> = candidates
        .par_iter()
        .map(|candidate| cv_score(candidate, x_train, y_train, &folds, n_features, config))
        .collect();

    // Evaluate in preference order (simpler families first, then grid
    // order) and only replace the incumbent on a strictly better score,
    // so ties fall to the simpler/faster candidate.
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| (candidates[i].complexity_rank(), i));

    let mut best: Option<(usize, f64)> = None;
    for i in order {
        let score = match &scores[i] {
            Ok(score) => *score,
            Err(e) => {
                return Err(SiftError::training(format!(
                    "candidate {:?} failed cross-validation: {e}",
                    candidates[i]
                )));
            }
        };
        debug!("candidate {:?}: cv accuracy {score:.4}", candidates[i]);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((i, score));
        }
    }
    let (best_index, cv_accuracy) = best.expect("at least one candidate was scored");
    let winner = &candidates[best_index];
    info!(
        "selected {} {:?} with cv accuracy {cv_accuracy:.4}",
        winner.model_type(),
        winner.describe()
    );

    // Refit on the full training split, then touch the test split exactly
    // once.
    let train_refs: Vec<&SparseVector> = x_train.iter().collect();
    let classifier = winner.fit(
        &train_refs,
        y_train,
        n_features,
        config.seed,
        config.sgd_epochs,
    )?;

    let predictions = classifier.predict_batch(x_test);
    let test_accuracy = accuracy(y_test, &predictions);
    let report = classification_report(y_test, &predictions);

    Ok(SelectionOutcome {
        classifier,
        model_type: winner.model_type(),
        best_params: winner.describe(),
        cv_accuracy,
        test_accuracy,
        report,
    })
}

/// Mean accuracy of a candidate over the precomputed folds.
fn cv_score(
    candidate: &CandidateParams,
    x: &[SparseVector],
    y: &[Label],
    folds: &[Vec<usize>],
    n_features: usize,
    config: &TrainingConfig,
) -> Result<f64> {
    let mut total = 0.0;
    for held_out in folds {
        let in_fold: Vec<bool> = {
            let mut mask = vec![false; x.len()];
            for &i in held_out {
                mask[i] = true;
            }
            mask
        };

        let mut train_rows = Vec::with_capacity(x.len() - held_out.len());
        let mut train_labels = Vec::with_capacity(x.len() - held_out.len());
        for (i, row) in x.iter().enumerate() {
            if !in_fold[i] {
                train_rows.push(row);
                train_labels.push(y[i]);
            }
        }

        let model = candidate.fit(
            &train_rows,
            &train_labels,
            n_features,
            config.seed,
            config.sgd_epochs,
        )?;

        let truth: Vec<Label> = held_out.iter().map(|&i| y[i]).collect();
        let predictions: Vec<Label> = held_out.iter().map(|&i| model.predict(&x[i])).collect();
        total += accuracy(&truth, &predictions);
    }
    Ok(total / folds.len() as f64)
}

/// Stratified train/test split over label indices. Each class contributes
/// `test_size` of its rows (at least one) to the test side, so the class
/// ratio is preserved across both splits. Returns sorted
/// `(train_indices, test_indices)`.
pub fn stratified_train_test_split(
    labels: &[Label],
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for label in Label::all() {
        let mut group: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .collect();
        if group.is_empty() {
            continue;
        }
        if group.len() < 2 {
            return Err(SiftError::validation(format!(
                "class '{label}' has only {} sample(s); need at least 2 for a stratified split",
                group.len()
            )));
        }
        group.shuffle(&mut rng);

        let n_test = ((group.len() as f64 * test_size).round() as usize)
            .clamp(1, group.len() - 1);
        test.extend_from_slice(&group[..n_test]);
        train.extend_from_slice(&group[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Stratified k-fold assignment: per class, indices are shuffled and dealt
/// round-robin across folds, preserving the class ratio in every fold.
/// Returns the held-out index set of each fold, sorted.
pub fn stratified_folds(labels: &[Label], k: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    if k < 2 {
        return Err(SiftError::validation("need at least 2 folds"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds: Vec<Vec<usize>> = vec![Vec::new(); k];

    let mut classes_seen = 0;
    for label in Label::all() {
        let mut group: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .collect();
        if group.is_empty() {
            continue;
        }
        classes_seen += 1;
        if group.len() < k {
            return Err(SiftError::validation(format!(
                "class '{label}' has {} sample(s), fewer than the {k} cross-validation folds",
                group.len()
            )));
        }
        group.shuffle(&mut rng);
        for (position, index) in group.into_iter().enumerate() {
            folds[position % k].push(index);
        }
    }

    if classes_seen < 2 {
        return Err(SiftError::validation(
            "stratified folding requires at least 2 distinct label values",
        ));
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    Ok(folds)
}

/// Fraction of predictions matching the truth.
pub fn accuracy(truth: &[Label], predictions: &[Label]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth
        .iter()
        .zip(predictions)
        .filter(|(t, p)| t == p)
        .count();
    hits as f64 / truth.len() as f64
}

/// Per-class precision/recall/F1 in a fixed-width human-readable table.
pub fn classification_report(truth: &[Label], predictions: &[Label]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>12} {:>9} {:>9} {:>9} {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    ));

    let mut f1_sum = 0.0;
    for label in Label::all() {
        let tp = count(truth, predictions, |t, p| t == label && p == label);
        let fp = count(truth, predictions, |t, p| t != label && p == label);
        let fn_ = count(truth, predictions, |t, p| t == label && p != label);
        let support = tp + fn_;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        f1_sum += f1;

        out.push_str(&format!(
            "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            label.as_str(),
            precision,
            recall,
            f1,
            support
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "{:>12} {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        accuracy(truth, predictions),
        truth.len()
    ));
    out.push_str(&format!(
        "{:>12} {:>9} {:>9} {:>9.2} {:>9}\n",
        "macro f1",
        "",
        "",
        f1_sum / Label::all().len() as f64,
        truth.len()
    ));
    out
}

fn count(truth: &[Label], predictions: &[Label], pred: impl Fn(Label, Label) -> bool) -> usize {
    truth
        .iter()
        .zip(predictions)
        .filter(|(t, p)| pred(**t, **p))
        .count()
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}
