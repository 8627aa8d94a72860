//! Deterministic stratified train/test splitting.
//!
//! Records are grouped by label, each group is put into canonical order and
//! shuffled with a generator seeded from the configured seed, and the first
//! `round(len * test_fraction)` records of each group go to the test subset.
//! Canonical ordering makes the result a function of the record *set*: the
//! order in which records arrive does not change membership.

use std::collections::BTreeMap;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::SplitConfig;
use crate::dataset::record::{LabelCounts, Record};
use crate::error::{Result, SardonicError};

/// Smallest stratum that can be represented in both subsets.
pub const MIN_STRATUM_SIZE: usize = 2;

/// A disjoint, exhaustive partition of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub train: Vec<Record>,
    pub test: Vec<Record>,
}

impl Split {
    /// Total number of records across both subsets.
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }

    /// Label counts of the training subset.
    pub fn train_counts(&self) -> LabelCounts {
        LabelCounts::from_records(&self.train)
    }

    /// Label counts of the test subset.
    pub fn test_counts(&self) -> LabelCounts {
        LabelCounts::from_records(&self.test)
    }
}

/// Stratified splitter with a fixed test fraction and seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSplitter {
    test_fraction: f64,
    seed: u64,
}

impl DatasetSplitter {
    /// Create a splitter. `test_fraction` must lie strictly inside (0, 1).
    pub fn new(test_fraction: f64, seed: u64) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(SardonicError::invalid_split(format!(
                "test fraction must lie in (0, 1), got {test_fraction}"
            )));
        }
        Ok(DatasetSplitter {
            test_fraction,
            seed,
        })
    }

    /// Create a splitter from configuration.
    pub fn from_config(config: &SplitConfig) -> Result<Self> {
        Self::new(config.test_fraction, config.seed)
    }

    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Partition `records` into train and test subsets.
    ///
    /// Fails with `EmptyCorpus` for no input and with `InvalidSplit` when a
    /// present label has fewer than [`MIN_STRATUM_SIZE`] records.
    pub fn split(&self, records: Vec<Record>) -> Result<Split> {
        if records.is_empty() {
            return Err(SardonicError::empty_corpus("nothing to split"));
        }

        let mut strata: BTreeMap<bool, Vec<Record>> = BTreeMap::new();
        for record in records {
            strata.entry(record.label).or_default().push(record);
        }

        for (label, stratum) in &strata {
            if stratum.len() < MIN_STRATUM_SIZE {
                return Err(SardonicError::invalid_split(format!(
                    "label {label} has {} record(s), need at least {MIN_STRATUM_SIZE}",
                    stratum.len()
                )));
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut train = Vec::new();
        let mut test = Vec::new();

        // BTreeMap iteration order (false, then true) fixes the draw order.
        for (label, mut stratum) in strata {
            stratum.sort_unstable();
            stratum.shuffle(&mut rng);

            let n_test = self.test_size(stratum.len());
            let stratum_train = stratum.split_off(n_test);
            debug!(
                "Stratum {label}: {} train, {} test",
                stratum_train.len(),
                stratum.len()
            );
            test.extend(stratum);
            train.extend(stratum_train);
        }

        // Interleave labels so subsets are not grouped by class.
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok(Split { train, test })
    }

    /// Test-subset size for a stratum, keeping at least one record per side.
    fn test_size(&self, len: usize) -> usize {
        let n = (len as f64 * self.test_fraction).round() as usize;
        n.clamp(1, len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(n: usize, positives: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("headline {i}"), i < positives).with_id(format!("id-{i}")))
            .collect()
    }

    fn test_ids(split: &Split) -> Vec<String> {
        let mut ids: Vec<String> = split.test.iter().filter_map(|r| r.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_split_is_deterministic() {
        let splitter = DatasetSplitter::new(0.3, 42).unwrap();
        let first = splitter.split(corpus(100, 30)).unwrap();
        let second = splitter.split(corpus(100, 30)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.test.len(), 30);
        assert_eq!(first.train.len(), 70);
        assert_eq!(first.test_counts().positive, 9);
        assert_eq!(first.train_counts().positive, 21);
    }

    #[test]
    fn test_split_independent_of_input_order() {
        let splitter = DatasetSplitter::new(0.3, 42).unwrap();
        let mut reversed = corpus(100, 30);
        reversed.reverse();

        let a = splitter.split(corpus(100, 30)).unwrap();
        let b = splitter.split(reversed).unwrap();
        assert_eq!(test_ids(&a), test_ids(&b));
    }

    #[test]
    fn test_split_depends_on_seed() {
        let a = DatasetSplitter::new(0.3, 42).unwrap().split(corpus(100, 30)).unwrap();
        let b = DatasetSplitter::new(0.3, 43).unwrap().split(corpus(100, 30)).unwrap();
        assert_ne!(test_ids(&a), test_ids(&b));
    }

    #[test]
    fn test_split_disjoint_and_exhaustive() {
        let split = DatasetSplitter::new(0.25, 7).unwrap().split(corpus(41, 13)).unwrap();
        assert_eq!(split.len(), 41);

        let mut all: Vec<String> = split
            .train
            .iter()
            .chain(split.test.iter())
            .filter_map(|r| r.id.clone())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 41);
    }

    #[test]
    fn test_stratification() {
        let split = DatasetSplitter::new(0.2, 1).unwrap().split(corpus(500, 120)).unwrap();
        let full_ratio = 120.0 / 500.0;
        assert!((split.test_counts().positive_ratio() - full_ratio).abs() < 0.01);
        assert!((split.train_counts().positive_ratio() - full_ratio).abs() < 0.01);
    }

    #[test]
    fn test_small_strata_keep_both_sides() {
        let split = DatasetSplitter::new(0.1, 0).unwrap().split(corpus(4, 2)).unwrap();
        assert_eq!(split.test_counts(), LabelCounts { positive: 1, negative: 1 });
        assert_eq!(split.train_counts(), LabelCounts { positive: 1, negative: 1 });
    }

    #[test]
    fn test_single_label_corpus() {
        let split = DatasetSplitter::new(0.5, 3).unwrap().split(corpus(10, 0)).unwrap();
        assert_eq!(split.test.len(), 5);
        assert_eq!(split.test_counts().positive, 0);
    }

    #[test]
    fn test_invalid_fraction() {
        for fraction in [0.0, 1.0, -1.0, 2.0, f64::NAN] {
            assert!(matches!(
                DatasetSplitter::new(fraction, 42),
                Err(SardonicError::InvalidSplit(_))
            ));
        }
    }

    #[test]
    fn test_stratum_too_small() {
        let splitter = DatasetSplitter::new(0.3, 42).unwrap();
        assert!(matches!(
            splitter.split(corpus(10, 1)),
            Err(SardonicError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_empty_input() {
        let splitter = DatasetSplitter::new(0.3, 42).unwrap();
        assert!(matches!(
            splitter.split(Vec::new()),
            Err(SardonicError::EmptyCorpus(_))
        ));
    }
}
