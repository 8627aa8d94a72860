//! Command line argument parsing for the Sardonic CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

/// Sardonic - sarcasm detection for news headlines
#[derive(Parser, Debug, Clone)]
#[command(name = "sardonic")]
#[command(about = "Train and apply a sarcasm classifier for news headlines")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct SardonicArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Pipeline configuration file (JSON); flags override its values
    #[arg(long, value_name = "FILE", env = "SARDONIC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl SardonicArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Read the corpus, split it and write the split tables
    Prepare(PrepareArgs),

    /// Train a classifier on the training split and save the model bundle
    Train(TrainArgs),

    /// Evaluate the saved model bundle on the test split
    Evaluate(EvaluateArgs),

    /// Prepare, train and evaluate in one go
    Run(RunArgs),

    /// Classify texts with the saved model bundle
    Predict(PredictArgs),

    /// Print the normalized form of texts
    Normalize(NormalizeArgs),
}

/// Corpus location and field names
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// JSON-lines corpus file
    #[arg(long, value_name = "PATH", env = "DATA_PATH")]
    pub corpus: Option<PathBuf>,

    /// Field holding the text
    #[arg(long)]
    pub text_field: Option<String>,

    /// Field holding the 0/1 label
    #[arg(long)]
    pub label_field: Option<String>,

    /// Identifier field, dropped from the feature tables
    #[arg(long)]
    pub id_field: Option<String>,
}

/// Split parameters
#[derive(Args, Debug, Clone, Default)]
pub struct SplitArgs {
    /// Fraction of each label that goes to the test split
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Random seed for the split
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Directory of the split tables
#[derive(Args, Debug, Clone, Default)]
pub struct ProcessedArgs {
    /// Directory for X_train.csv, X_test.csv, y_train.csv, y_test.csv
    #[arg(long, value_name = "DIR", env = "PROCESSED_PATH")]
    pub processed_dir: Option<PathBuf>,
}

/// Directory of the model bundle
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Directory holding classifier.bundle
    #[arg(long, value_name = "DIR", env = "MODEL_PATH")]
    pub model_dir: Option<PathBuf>,
}

/// Classifier hyperparameters
#[derive(Args, Debug, Clone, Default)]
pub struct ClassifierArgs {
    /// Gradient descent step size
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Maximum gradient descent iterations
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// L2 penalty strength
    #[arg(long)]
    pub l2: Option<f64>,
}

/// Arguments for `prepare`
#[derive(Args, Debug, Clone)]
pub struct PrepareArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    #[command(flatten)]
    pub processed: ProcessedArgs,
}

/// Arguments for `train`
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub processed: ProcessedArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

/// Arguments for `evaluate`
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub processed: ProcessedArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for `run`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[command(flatten)]
    pub split: SplitArgs,

    #[command(flatten)]
    pub processed: ProcessedArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub classifier: ClassifierArgs,
}

/// Arguments for `predict`
#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Texts to classify (one per line from stdin when omitted)
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Arguments for `normalize`
#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    /// Show the output of every normalization stage
    #[arg(long)]
    pub trace: bool,

    /// Texts to normalize (one per line from stdin when omitted)
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl CorpusArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(path) = &self.corpus {
            config.corpus_path = path.clone();
        }
        if let Some(field) = &self.text_field {
            config.schema.text_field = field.clone();
        }
        if let Some(field) = &self.label_field {
            config.schema.label_field = field.clone();
        }
        if let Some(field) = &self.id_field {
            config.schema.id_field = Some(field.clone());
        }
    }
}

impl SplitArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(fraction) = self.test_fraction {
            config.split.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
        }
    }
}

impl ProcessedArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.processed_dir {
            config.processed_dir = dir.clone();
        }
    }
}

impl ModelArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.model_dir {
            config.model_dir = dir.clone();
        }
    }
}

impl ClassifierArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(rate) = self.learning_rate {
            config.classifier.learning_rate = rate;
        }
        if let Some(max_iter) = self.max_iter {
            config.classifier.max_iter = max_iter;
        }
        if let Some(l2) = self.l2 {
            config.classifier.l2 = l2;
        }
    }
}
