//! Text analysis pipeline.
//!
//! Raw messages pass through [`normalizer::normalize`] to obtain the
//! canonical token string, and [`ngram::ngrams`] extracts the n-gram terms
//! the vectorizer operates on. Normalization is total, deterministic, and
//! idempotent; everything downstream assumes its output alphabet
//! (`[a-z0-9 ]`, single spaces, no leading/trailing whitespace).

pub mod ngram;
pub mod normalizer;

pub use ngram::ngrams;
pub use normalizer::normalize;
