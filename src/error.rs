//! Error types for the spamsift library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SiftError`] enum. Each variant corresponds to a distinct caller-facing
//! condition so adapters (CLI, HTTP, ...) can map them without string
//! matching.
//!
//! # Examples
//!
//! ```
//! use spamsift::error::{Result, SiftError};
//!
//! fn check_message(message: &str) -> Result<()> {
//!     if message.is_empty() {
//!         return Err(SiftError::validation("message must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_message("").is_err());
//! ```

use std::io;
use std::path::Path;

use thiserror::Error;

/// The main error type for spamsift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// Malformed input: missing columns, empty messages, degenerate
    /// datasets. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Inference was attempted while no model is loaded. Train first.
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    /// One or both persisted artifacts are missing. Expected on a fresh
    /// deployment; fatal when hit by a reload-after-training.
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Any failure during vectorization, fitting, or model selection.
    /// The previously active model, if any, stays in service.
    #[error("Training error: {0}")]
    Training(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// CSV parsing errors from dataset ingestion.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Artifact (de)serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`SiftError`].
pub type Result<T> = std::result::Result<T, SiftError>;

impl SiftError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        SiftError::Validation(msg.into())
    }

    /// Create a new model-not-loaded error.
    pub fn model_not_loaded<S: Into<String>>(msg: S) -> Self {
        SiftError::ModelNotLoaded(msg.into())
    }

    /// Create a new artifact-not-found error for the given path.
    pub fn artifact_not_found(path: &Path) -> Self {
        SiftError::ArtifactNotFound(format!(
            "missing artifact file '{}'; run training first",
            path.display()
        ))
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        SiftError::Training(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SiftError::Serialization(msg.into())
    }

    /// True if this error means artifacts were absent (the non-fatal
    /// startup condition).
    pub fn is_artifact_not_found(&self) -> bool {
        matches!(self, SiftError::ArtifactNotFound(_))
    }
}

impl From<bincode::Error> for SiftError {
    fn from(err: bincode::Error) -> Self {
        SiftError::Serialization(err.to_string())
    }
}
