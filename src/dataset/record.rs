//! Labeled corpus records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One labeled text from the corpus.
///
/// The derived ordering (id, text, label, extra) is the canonical order used
/// to make splits independent of input order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Opaque identifier; carried along but never used for learning.
    pub id: Option<String>,
    /// Raw (un-normalized) text.
    pub text: String,
    /// Binary label (`true` = sarcastic).
    pub label: bool,
    /// Other corpus columns, stringified.
    pub extra: BTreeMap<String, String>,
}

impl Record {
    /// Create a record with no identifier or extra columns.
    pub fn new<S: Into<String>>(text: S, label: bool) -> Self {
        Record {
            id: None,
            text: text.into(),
            label,
            extra: BTreeMap::new(),
        }
    }

    /// Attach an identifier.
    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach an extra column value.
    pub fn with_extra<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Per-label record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    /// Records labeled `true`.
    pub positive: usize,
    /// Records labeled `false`.
    pub negative: usize,
}

impl LabelCounts {
    /// Count labels over a record slice.
    pub fn from_records(records: &[Record]) -> Self {
        Self::from_labels(records.iter().map(|r| r.label))
    }

    /// Count labels over any label iterator.
    pub fn from_labels<I: IntoIterator<Item = bool>>(labels: I) -> Self {
        labels
            .into_iter()
            .fold(LabelCounts::default(), |mut counts, label| {
                if label {
                    counts.positive += 1;
                } else {
                    counts.negative += 1;
                }
                counts
            })
    }

    /// Total number of records.
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }

    /// Share of `true` labels, or 0 for an empty set.
    pub fn positive_ratio(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.positive as f64 / self.total() as f64
        }
    }
}
