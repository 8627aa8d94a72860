//! # Sardonic
//!
//! Sarcasm detection for news headlines: a reproducible text classification
//! pipeline whose normalization is shared byte-for-byte between training and
//! inference.
//!
//! ## Features
//!
//! - Fixed HTML-aware normalization pipeline built from char filters
//! - Deterministic stratified train/test splitting
//! - Bag-of-words features with a vocabulary fitted on training text only
//! - Logistic regression classifier with a full classification report
//! - Checksummed model bundle pairing the classifier with its vocabulary

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ml;
pub mod pipeline;
pub mod util;

pub mod prelude {
    pub use crate::analysis::{NormalizedText, TextNormalizer, normalize};
    pub use crate::config::PipelineConfig;
    pub use crate::dataset::{DatasetSplitter, Record, Split};
    pub use crate::error::{Result, SardonicError};
    pub use crate::ml::{ClassificationReport, ModelBundle};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
