//! # spamsift
//!
//! A spam/ham classifier for short text messages.
//!
//! ## Features
//!
//! - Deterministic text normalization pipeline
//! - TF-IDF features over word unigrams and bigrams
//! - Cross-validated grid search over linear classifiers
//! - Persisted vectorizer/classifier artifact pairs
//! - Thread-safe inference with atomic model replacement

pub mod analysis;
pub mod artifacts;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod selection;
pub mod service;
pub mod trainer;
pub mod vectorize;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
