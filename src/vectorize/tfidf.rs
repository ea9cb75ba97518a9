//! TF-IDF vectorizer over word n-grams.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analysis::ngrams;
use crate::error::{Result, SiftError};
use crate::vectorize::SparseVector;

/// A two-phase TF-IDF transform: [`fit`](TfIdfVectorizer::fit) builds a
/// capped vocabulary over a training corpus, [`transform`](TfIdfVectorizer::transform)
/// projects text onto that frozen vocabulary.
///
/// Vocabulary selection keeps the `max_features` n-grams with the highest
/// total corpus frequency; ties are broken by lexicographic order so a
/// refit over the same corpus reproduces the same feature space. Feature
/// indices are assigned in lexicographic order of the selected terms.
///
/// IDF uses the smoothed form `ln((1 + n_docs) / (1 + df)) + 1`, and each
/// transformed row is L2-normalized. Terms unseen at fit time contribute
/// nothing at transform time; the vocabulary never grows after `fit`.
///
/// `transform` takes `&self` and is safe to call concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    max_features: usize,
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(max_features: usize, ngram_range: (usize, usize)) -> Self {
        Self {
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            ngram_range,
            max_features,
            n_documents: 0,
        }
    }

    /// Fit the vocabulary and IDF weights on a training corpus of
    /// normalized texts. Call exactly once per training run, on the
    /// training split only.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(SiftError::training("cannot fit vectorizer on an empty corpus"));
        }

        let (min_n, max_n) = self.ngram_range;
        let mut term_counts: HashMap<String, u64> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = ngrams(doc, min_n, max_n);
            let mut seen_in_doc: HashSet<&str> = HashSet::new();
            for gram in &grams {
                if seen_in_doc.insert(gram.as_str()) {
                    *document_frequency.entry(gram.clone()).or_insert(0) += 1;
                }
            }
            for gram in grams {
                *term_counts.entry(gram).or_insert(0) += 1;
            }
        }

        // Rank by corpus frequency, lexicographic on ties, and cap.
        let mut ranked: Vec<(String, u64)> = term_counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.max_features);

        // Indices follow lexicographic order of the surviving terms.
        let mut selected: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort_unstable();

        let n_docs = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(selected.len());
        let mut idf = Vec::with_capacity(selected.len());
        for (index, term) in selected.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index as u32);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = documents.len();

        Ok(())
    }

    /// Project normalized texts onto the fitted vocabulary, preserving
    /// input order. Rows are L2-normalized; a text with no known terms
    /// maps to the all-zero vector.
    pub fn transform(&self, documents: &[String]) -> Result<Vec<SparseVector>> {
        if !self.is_fitted() {
            return Err(SiftError::training("vectorizer has not been fitted"));
        }
        Ok(documents.iter().map(|doc| self.transform_one(doc)).collect())
    }

    fn transform_one(&self, document: &str) -> SparseVector {
        let (min_n, max_n) = self.ngram_range;
        let mut counts: HashMap<u32, f64> = HashMap::new();
        for gram in ngrams(document, min_n, max_n) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index as usize]))
            .collect();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let indices: Vec<u32> = entries.iter().map(|&(index, _)| index).collect();
        let values: Vec<f64> = entries.iter().map(|&(_, value)| value).collect();
        let mut vector = SparseVector::new(indices, values);

        let norm = vector.l2_norm();
        if norm > 0.0 {
            vector.scale(1.0 / norm);
        }
        vector
    }

    /// True once `fit` has completed.
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Size of the fitted vocabulary (the feature-space dimensionality).
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents seen at fit time.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Fitted terms in index order (mainly for diagnostics).
    pub fn terms(&self) -> Vec<&str> {
        let mut terms: Vec<(&str, u32)> = self
            .vocabulary
            .iter()
            .map(|(term, &index)| (term.as_str(), index))
            .collect();
        terms.sort_unstable_by_key(|&(_, index)| index);
        terms.into_iter().map(|(term, _)| term).collect()
    }
}
