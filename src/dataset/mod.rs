//! Corpus records, loading, splitting and split persistence.

pub mod artifacts;
pub mod jsonl;
pub mod record;
pub mod splitter;

pub use artifacts::SplitArtifacts;
pub use jsonl::JsonlCorpusReader;
pub use record::{LabelCounts, Record};
pub use splitter::{DatasetSplitter, Split};
