//! Feature vectorization.
//!
//! [`tfidf::TfIdfVectorizer`] maps normalized text into a fixed,
//! frozen-vocabulary TF-IDF feature space; [`sparse::SparseVector`] is the
//! row representation shared with the classifiers.

pub mod sparse;
pub mod tfidf;

pub use sparse::SparseVector;
pub use tfidf::TfIdfVectorizer;
