//! Batch operations: prepare, train, evaluate, predict.
//!
//! Each operation takes the [`PipelineConfig`] built at program entry, runs to
//! completion and returns a serializable summary. A failure aborts the
//! operation; nothing is retried.
//!
//! ```text
//! corpus.jsonl ─prepare─► X_train/X_test/y_train/y_test ─train─► classifier.bundle
//!                                      │                              │
//!                                      └───────────evaluate◄──────────┘
//! ```
//!
//! Training and every inference path normalize through the same
//! [`TextNormalizer`], and the classifier is only reachable through a
//! [`ModelBundle`], so features are always built with the vocabulary the
//! classifier was trained on.

use std::fmt;
use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::analysis::normalizer::{NormalizedText, TextNormalizer};
use crate::config::PipelineConfig;
use crate::dataset::jsonl::JsonlCorpusReader;
use crate::dataset::record::{LabelCounts, Record};
use crate::dataset::splitter::DatasetSplitter;
use crate::error::Result;
use crate::ml::bundle::{BundleMetadata, ModelBundle};
use crate::ml::metrics::ClassificationReport;

/// Outcome of [`prepare`].
#[derive(Debug, Clone, Serialize)]
pub struct PrepareSummary {
    pub records: usize,
    pub train: LabelCounts,
    pub test: LabelCounts,
    pub processed_dir: PathBuf,
}

impl fmt::Display for PrepareSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prepared {} records in {}", self.records, self.processed_dir.display())?;
        writeln!(
            f,
            "  train: {:>7} ({} sarcastic, {} not)",
            self.train.total(),
            self.train.positive,
            self.train.negative
        )?;
        write!(
            f,
            "  test:  {:>7} ({} sarcastic, {} not)",
            self.test.total(),
            self.test.positive,
            self.test.negative
        )
    }
}

/// Outcome of [`train`].
#[derive(Debug, Clone, Serialize)]
pub struct TrainSummary {
    pub metadata: BundleMetadata,
    pub bundle_path: PathBuf,
}

impl fmt::Display for TrainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trained model saved to {}", self.bundle_path.display())?;
        writeln!(f, "  samples:    {}", self.metadata.training_samples)?;
        writeln!(f, "  vocabulary: {}", self.metadata.vocabulary_size)?;
        write!(f, "  iterations: {}", self.metadata.iterations)
    }
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub samples: usize,
    pub report: ClassificationReport,
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Evaluated {} test samples", self.samples)?;
        writeln!(f)?;
        write!(f, "{}", self.report)
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub prepare: PrepareSummary,
    pub train: TrainSummary,
    pub evaluation: EvaluationSummary,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.prepare)?;
        writeln!(f)?;
        writeln!(f, "{}", self.train)?;
        writeln!(f)?;
        write!(f, "{}", self.evaluation)
    }
}

/// One classified text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub text: String,
    pub normalized: NormalizedText,
    pub probability: f64,
    pub sarcastic: bool,
}

/// Predictions for a batch of texts.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Predictions(pub Vec<Prediction>);

impl fmt::Display for Predictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, prediction) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:<13} {:.3}  {}",
                if prediction.sarcastic { "sarcastic" } else { "not sarcastic" },
                prediction.probability,
                prediction.text
            )?;
        }
        Ok(())
    }
}

/// Load the corpus, split it and write the split tables.
pub fn prepare(config: &PipelineConfig) -> Result<PrepareSummary> {
    config.validate()?;
    info!("Reading corpus from {}", config.corpus_path.display());

    let records = JsonlCorpusReader::new(config.schema.clone()).read_path(&config.corpus_path)?;
    let total = records.len();

    let splitter = DatasetSplitter::from_config(&config.split)?;
    let split = splitter.split(records)?;
    info!(
        "Split {total} records into {} train / {} test (fraction {}, seed {})",
        split.train.len(),
        split.test.len(),
        splitter.test_fraction(),
        splitter.seed()
    );

    config.artifacts().write(&split, &config.schema)?;

    Ok(PrepareSummary {
        records: total,
        train: split.train_counts(),
        test: split.test_counts(),
        processed_dir: config.processed_dir.clone(),
    })
}

/// Train on the training split and persist the bundle.
pub fn train(config: &PipelineConfig) -> Result<TrainSummary> {
    config.validate()?;

    let records = config.artifacts().read_train(&config.schema)?;
    info!("Training on {} records", records.len());
    let (texts, labels) = normalize_records(&TextNormalizer::default(), &records);

    let bundle = ModelBundle::train(&texts, &labels, &config.classifier)?;
    let bundle_path = config.bundle_path();
    bundle.save(&bundle_path)?;

    Ok(TrainSummary {
        metadata: bundle.metadata().clone(),
        bundle_path,
    })
}

/// Score the persisted bundle on the test split.
///
/// Fails with `ModelNotFound` when no bundle exists; training is never
/// started implicitly.
pub fn evaluate(config: &PipelineConfig) -> Result<EvaluationSummary> {
    config.validate()?;

    let bundle = ModelBundle::load(config.bundle_path())?;
    let records = config.artifacts().read_test(&config.schema)?;
    info!("Evaluating on {} records", records.len());

    let (texts, actual) = normalize_records(&TextNormalizer::default(), &records);
    let predicted = bundle.predict(&texts)?;
    let report = ClassificationReport::evaluate(&predicted, &actual)?;
    info!("Accuracy {:.4}", report.accuracy);

    Ok(EvaluationSummary {
        samples: records.len(),
        report,
    })
}

/// [`prepare`], [`train`] and [`evaluate`] in sequence.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let prepare = prepare(config)?;
    let train = train(config)?;
    let evaluation = evaluate(config)?;
    Ok(RunSummary {
        prepare,
        train,
        evaluation,
    })
}

/// Classify raw texts with the persisted bundle.
pub fn predict<S>(config: &PipelineConfig, raws: &[S]) -> Result<Predictions>
where
    S: AsRef<str> + Sync,
{
    let bundle = ModelBundle::load(config.bundle_path())?;
    let normalized = TextNormalizer::default().normalize_all(raws);
    let probabilities = bundle.predict_proba(&normalized)?;

    let predictions = raws
        .iter()
        .zip(normalized)
        .zip(probabilities)
        .map(|((raw, normalized), probability)| Prediction {
            text: raw.as_ref().to_string(),
            normalized,
            probability,
            sarcastic: probability >= crate::ml::logistic::DECISION_THRESHOLD,
        })
        .collect();
    Ok(Predictions(predictions))
}

fn normalize_records(
    normalizer: &TextNormalizer,
    records: &[Record],
) -> (Vec<NormalizedText>, Vec<bool>) {
    let raws: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    let labels = records.iter().map(|r| r.label).collect();
    (normalizer.normalize_all(&raws), labels)
}
