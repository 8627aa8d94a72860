//! Pipeline configuration.
//!
//! A [`PipelineConfig`] is built once at program entry (from CLI flags,
//! environment-backed flags or a JSON file) and handed by reference to every
//! operation in [`crate::pipeline`]. Nothing below the CLI reads process
//! environment.
//!
//! # Examples
//!
//! ```
//! use sardonic::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! assert_eq!(config.split.test_fraction, 0.3);
//! assert_eq!(config.split.seed, 42);
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::artifacts::SplitArtifacts;
use crate::error::{Result, SardonicError};
use crate::ml::bundle::BUNDLE_FILE_NAME;
use crate::ml::logistic::LogisticRegressionConfig;

/// Field names of the JSON-lines corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSchema {
    /// Field holding the raw text.
    pub text_field: String,
    /// Field holding the binary label (`0`/`1` or `false`/`true`).
    pub label_field: String,
    /// Identifier field; preserved on records, excluded from feature tables.
    pub id_field: Option<String>,
}

impl Default for CorpusSchema {
    fn default() -> Self {
        Self {
            text_field: "headline".to_string(),
            label_field: "is_sarcastic".to_string(),
            id_field: Some("article_link".to_string()),
        }
    }
}

/// Train/test split parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of each label stratum that goes to the test subset.
    pub test_fraction: f64,
    /// Seed for the split's pseudo-random generator.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 42,
        }
    }
}

/// Complete configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// JSON-lines corpus to read.
    pub corpus_path: PathBuf,
    /// Directory for the four split artifacts.
    pub processed_dir: PathBuf,
    /// Directory holding the persisted model bundle.
    pub model_dir: PathBuf,
    /// Corpus field names.
    pub schema: CorpusSchema,
    /// Split parameters.
    pub split: SplitConfig,
    /// Classifier hyperparameters.
    pub classifier: LogisticRegressionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/raw/headlines.jsonl"),
            processed_dir: PathBuf::from("data/processed"),
            model_dir: PathBuf::from("models"),
            schema: CorpusSchema::default(),
            split: SplitConfig::default(),
            classifier: LogisticRegressionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content).map_err(|e| {
            SardonicError::invalid_config(format!("{}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Check every value that would otherwise fail deep inside a stage.
    pub fn validate(&self) -> Result<()> {
        let fraction = self.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(SardonicError::invalid_split(format!(
                "test_fraction must lie in (0, 1), got {fraction}"
            )));
        }
        if self.schema.text_field.is_empty() || self.schema.label_field.is_empty() {
            return Err(SardonicError::invalid_config(
                "text_field and label_field must be non-empty",
            ));
        }
        if self.schema.id_field.as_deref() == Some("") {
            return Err(SardonicError::invalid_config("id_field must be non-empty"));
        }
        if self.schema.text_field == self.schema.label_field {
            return Err(SardonicError::invalid_config(
                "text_field and label_field must differ",
            ));
        }
        self.classifier.validate()
    }

    /// Locations of the split artifacts.
    pub fn artifacts(&self) -> SplitArtifacts {
        SplitArtifacts::in_dir(&self.processed_dir)
    }

    /// Location of the model bundle.
    pub fn bundle_path(&self) -> PathBuf {
        self.model_dir.join(BUNDLE_FILE_NAME)
    }
}
