//! Error types for the Sardonic pipeline.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SardonicError`] enum. Every variant is fatal for the batch run that
//! produced it: the pipeline never retries a failed stage.
//!
//! # Examples
//!
//! ```
//! use sardonic::error::{SardonicError, Result};
//!
//! fn check_fraction(fraction: f64) -> Result<()> {
//!     if fraction <= 0.0 || fraction >= 1.0 {
//!         return Err(SardonicError::invalid_split("fraction must lie in (0, 1)"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_fraction(0.3).is_ok());
//! assert!(check_fraction(1.5).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Sardonic operations.
#[derive(Error, Debug)]
pub enum SardonicError {
    /// I/O errors (missing corpus, unwritable output directory, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The corpus holds no records once empty texts are dropped.
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    /// The split fraction is out of range or a label stratum is too small.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed corpus or split artifact content.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// A model bundle could not be read back.
    #[error("Bundle error: {0}")]
    Bundle(String),

    /// No persisted model bundle exists where one was expected.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Feature vector dimension does not match the classifier.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Training was attempted on too little data.
    #[error("Training data insufficient: need at least {min_samples} samples, got {actual}")]
    InsufficientTrainingData { min_samples: usize, actual: usize },

    /// Binary serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for operations that may fail with SardonicError.
pub type Result<T> = std::result::Result<T, SardonicError>;

impl SardonicError {
    /// Create a new empty corpus error.
    pub fn empty_corpus<S: Into<String>>(msg: S) -> Self {
        SardonicError::EmptyCorpus(msg.into())
    }

    /// Create a new invalid split error.
    pub fn invalid_split<S: Into<String>>(msg: S) -> Self {
        SardonicError::InvalidSplit(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SardonicError::InvalidConfig(msg.into())
    }

    /// Create a new corpus error.
    pub fn corpus<S: Into<String>>(msg: S) -> Self {
        SardonicError::Corpus(msg.into())
    }

    /// Create a new bundle error.
    pub fn bundle<S: Into<String>>(msg: S) -> Self {
        SardonicError::Bundle(msg.into())
    }

    /// Create a new model not found error.
    pub fn model_not_found<S: Into<String>>(msg: S) -> Self {
        SardonicError::ModelNotFound(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SardonicError::Serialization(msg.into())
    }
}

impl From<bincode::Error> for SardonicError {
    fn from(err: bincode::Error) -> Self {
        SardonicError::Serialization(err.to_string())
    }
}
