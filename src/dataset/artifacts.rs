//! The four persisted split tables.
//!
//! ```text
//! <processed_dir>/X_train.csv   text column + extra columns
//! <processed_dir>/X_test.csv
//! <processed_dir>/y_train.csv   single label column, 0/1
//! <processed_dir>/y_test.csv
//! ```
//!
//! Feature tables hold every original column except the label and the
//! identifier, with the text column first and the rest in sorted order. Each
//! file is serialized in memory and written atomically.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::info;

use crate::config::CorpusSchema;
use crate::dataset::jsonl::parse_label_str;
use crate::dataset::record::Record;
use crate::dataset::splitter::Split;
use crate::error::{Result, SardonicError};
use crate::util::fs::write_atomic;

pub const X_TRAIN_FILE: &str = "X_train.csv";
pub const X_TEST_FILE: &str = "X_test.csv";
pub const Y_TRAIN_FILE: &str = "y_train.csv";
pub const Y_TEST_FILE: &str = "y_test.csv";

/// Paths of the split tables under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitArtifacts {
    pub x_train: PathBuf,
    pub x_test: PathBuf,
    pub y_train: PathBuf,
    pub y_test: PathBuf,
}

impl SplitArtifacts {
    /// Standard file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        SplitArtifacts {
            x_train: dir.join(X_TRAIN_FILE),
            x_test: dir.join(X_TEST_FILE),
            y_train: dir.join(Y_TRAIN_FILE),
            y_test: dir.join(Y_TEST_FILE),
        }
    }

    /// Whether all four tables exist.
    pub fn exist(&self) -> bool {
        [&self.x_train, &self.x_test, &self.y_train, &self.y_test]
            .iter()
            .all(|path| path.is_file())
    }

    /// Write both subsets. Parent directories are created as needed.
    pub fn write(&self, split: &Split, schema: &CorpusSchema) -> Result<()> {
        let columns = extra_column_names(split, schema)?;

        write_atomic(&self.x_train, &features_csv(&split.train, schema, &columns)?)?;
        write_atomic(&self.x_test, &features_csv(&split.test, schema, &columns)?)?;
        write_atomic(&self.y_train, &labels_csv(&split.train, schema)?)?;
        write_atomic(&self.y_test, &labels_csv(&split.test, schema)?)?;

        info!(
            "Wrote {} train and {} test rows to {}",
            split.train.len(),
            split.test.len(),
            self.x_train
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
        Ok(())
    }

    /// Read the training subset back.
    pub fn read_train(&self, schema: &CorpusSchema) -> Result<Vec<Record>> {
        read_pair(&self.x_train, &self.y_train, schema)
    }

    /// Read the test subset back.
    pub fn read_test(&self, schema: &CorpusSchema) -> Result<Vec<Record>> {
        read_pair(&self.x_test, &self.y_test, schema)
    }
}

/// Union of extra column names across both subsets, sorted.
fn extra_column_names(split: &Split, schema: &CorpusSchema) -> Result<Vec<String>> {
    let names: BTreeSet<&String> = split
        .train
        .iter()
        .chain(split.test.iter())
        .flat_map(|record| record.extra.keys())
        .collect();

    if names.contains(&schema.text_field) {
        return Err(SardonicError::corpus(format!(
            "extra column {:?} collides with the text column",
            schema.text_field
        )));
    }
    Ok(names.into_iter().cloned().collect())
}

fn features_csv(records: &[Record], schema: &CorpusSchema, columns: &[String]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    let mut header = vec![schema.text_field.as_str()];
    header.extend(columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.text.as_str()];
        row.extend(
            columns
                .iter()
                .map(|c| record.extra.get(c).map(String::as_str).unwrap_or("")),
        );
        writer.write_record(&row)?;
    }
    finish(writer)
}

fn labels_csv(records: &[Record], schema: &CorpusSchema) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record([schema.label_field.as_str()])?;
    for record in records {
        writer.write_record([if record.label { "1" } else { "0" }])?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| SardonicError::Io(e.into_error()))
}

fn read_pair(features: &Path, labels: &Path, schema: &CorpusSchema) -> Result<Vec<Record>> {
    let mut x_reader = ReaderBuilder::new().from_path(features)?;
    let headers = x_reader.headers()?.clone();
    let text_idx = column_index(&headers, &schema.text_field, features)?;

    let mut y_reader = ReaderBuilder::new().from_path(labels)?;
    let y_headers = y_reader.headers()?.clone();
    let label_idx = column_index(&y_headers, &schema.label_field, labels)?;

    let rows: Vec<StringRecord> = x_reader.records().collect::<std::result::Result<_, _>>()?;
    let label_rows: Vec<StringRecord> = y_reader.records().collect::<std::result::Result<_, _>>()?;

    if rows.len() != label_rows.len() {
        return Err(SardonicError::corpus(format!(
            "{} has {} rows but {} has {}",
            features.display(),
            rows.len(),
            labels.display(),
            label_rows.len()
        )));
    }

    rows.iter()
        .zip(label_rows.iter())
        .enumerate()
        .map(|(i, (row, label_row))| -> Result<Record> {
            let raw_label = label_row.get(label_idx).unwrap_or("");
            let label = parse_label_str(raw_label).ok_or_else(|| {
                SardonicError::corpus(format!(
                    "{} row {}: label {raw_label:?} is not binary",
                    labels.display(),
                    i + 1
                ))
            })?;

            let mut record = Record::new(row.get(text_idx).unwrap_or(""), label);
            for (idx, (name, value)) in headers.iter().zip(row.iter()).enumerate() {
                if idx != text_idx {
                    record.extra.insert(name.to_string(), value.to_string());
                }
            }
            Ok(record)
        })
        .collect()
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        SardonicError::corpus(format!("{} has no column {name:?}", path.display()))
    })
}
