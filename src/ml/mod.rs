//! Features, classifier, evaluation and the persisted model bundle.
//!
//! Normalized text becomes [`vectorizer::SparseVector`]s through a
//! [`vectorizer::Vocabulary`] fitted on training text only. A
//! [`logistic::LogisticRegression`] is trained on those vectors and stored
//! together with its vocabulary in a [`bundle::ModelBundle`].

pub mod bundle;
pub mod logistic;
pub mod metrics;
pub mod vectorizer;

pub use bundle::{BundleMetadata, ModelBundle};
pub use logistic::{LogisticRegression, LogisticRegressionConfig};
pub use metrics::{ClassificationReport, ConfusionMatrix};
pub use vectorizer::{SparseVector, Vocabulary};
