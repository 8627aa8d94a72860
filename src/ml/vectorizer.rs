//! Bag-of-words term-frequency features.
//!
//! [`fit`] builds a [`Vocabulary`] from normalized training text, assigning
//! indices in first-seen order. [`transform`] maps normalized text to
//! [`SparseVector`]s of dimension `vocabulary.len()`, counting in-vocabulary
//! tokens and ignoring the rest.

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::{NormalizedText, is_canonical};
use crate::error::{Result, SardonicError};

/// Token to feature index mapping, fixed once fitted.
///
/// Serialized as the ordered term list; the lookup table is rebuilt on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: AHashMap<String, usize>,
}

impl Vocabulary {
    /// Number of features.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Feature index of `token`, if it was seen during fitting.
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Token at feature index `idx`.
    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    /// All tokens in index order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Encode one text as term counts.
    pub fn vectorize(&self, text: &NormalizedText) -> SparseVector {
        let mut counts: AHashMap<usize, f64> = AHashMap::new();
        for token in text.tokens() {
            if let Some(idx) = self.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts.into_iter().collect();
        entries.sort_unstable_by_key(|(idx, _)| *idx);
        SparseVector {
            dim: self.len(),
            entries,
        }
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = SardonicError;

    fn try_from(terms: Vec<String>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate() {
            if term.is_empty() || term.contains(' ') || !is_canonical(term) {
                return Err(SardonicError::bundle(format!(
                    "vocabulary term {idx} ({term:?}) is not a normalized token"
                )));
            }
            if index.insert(term.clone(), idx).is_some() {
                return Err(SardonicError::bundle(format!(
                    "vocabulary term {term:?} appears twice"
                )));
            }
        }
        Ok(Vocabulary { terms, index })
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

/// A count vector stored as sorted `(index, value)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// An all-zero vector.
    pub fn zeros(dim: usize) -> Self {
        SparseVector {
            dim,
            entries: Vec::new(),
        }
    }

    /// Build from a dense slice, keeping non-zero entries.
    pub fn from_dense(values: &[f64]) -> Self {
        SparseVector {
            dim: values.len(),
            entries: values
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != 0.0)
                .map(|(i, v)| (i, *v))
                .collect(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Non-zero entries in increasing index order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `idx` (zero when not stored).
    pub fn get(&self, idx: usize) -> f64 {
        self.entries
            .binary_search_by_key(&idx, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Dot product with a dense weight slice of the same dimension.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries.iter().map(|(i, v)| v * dense[*i]).sum()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, v) in &self.entries {
            dense[*i] = *v;
        }
        dense
    }
}

/// Build a vocabulary from training text in first-seen token order.
pub fn fit(texts: &[NormalizedText]) -> Vocabulary {
    let mut terms = Vec::new();
    let mut index = AHashMap::new();
    for text in texts {
        for token in text.tokens() {
            if !index.contains_key(token) {
                index.insert(token.to_string(), terms.len());
                terms.push(token.to_string());
            }
        }
    }
    Vocabulary { terms, index }
}

/// Encode texts against a fitted vocabulary, preserving order.
pub fn transform(texts: &[NormalizedText], vocabulary: &Vocabulary) -> Vec<SparseVector> {
    texts
        .par_iter()
        .map(|text| vocabulary.vectorize(text))
        .collect()
}

/// [`fit`] then [`transform`] the same texts.
pub fn fit_transform(texts: &[NormalizedText]) -> (Vocabulary, Vec<SparseVector>) {
    let vocabulary = fit(texts);
    let features = transform(texts, &vocabulary);
    (vocabulary, features)
}
