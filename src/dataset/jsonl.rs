//! JSON Lines corpus reader.
//!
//! Each non-blank line is one JSON object:
//!
//! ```jsonl
//! {"article_link": "https://...", "headline": "area man passionate defender of ...", "is_sarcastic": 1}
//! ```
//!
//! Field names come from [`CorpusSchema`]. Labels may be booleans, the numbers
//! `0`/`1`, or the strings `"0"`/`"1"`/`"true"`/`"false"`. Records whose text
//! is empty (or whitespace only) are dropped before anything else sees them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::config::CorpusSchema;
use crate::dataset::record::Record;
use crate::error::{Result, SardonicError};

/// Reads labeled records from JSON Lines input.
#[derive(Debug, Clone, Default)]
pub struct JsonlCorpusReader {
    schema: CorpusSchema,
}

impl JsonlCorpusReader {
    /// Create a reader for the given schema.
    pub fn new(schema: CorpusSchema) -> Self {
        JsonlCorpusReader { schema }
    }

    /// Read a corpus file. Fails with `EmptyCorpus` if no record survives.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Record>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SardonicError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot open corpus {}: {e}", path.display()),
            ))
        })?;
        self.read(BufReader::new(file))
    }

    /// Read a corpus from any buffered reader.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut dropped = 0usize;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match self.parse_line(&line, line_num + 1)? {
                Some(record) => records.push(record),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            info!("Dropped {dropped} records with empty text");
        }

        if records.is_empty() {
            return Err(SardonicError::empty_corpus(
                "no records with non-empty text",
            ));
        }

        info!("Loaded {} records", records.len());
        Ok(records)
    }

    /// Parse one line; `None` means the record has empty text.
    fn parse_line(&self, line: &str, line_num: usize) -> Result<Option<Record>> {
        let value: Value = serde_json::from_str(line).map_err(|e| {
            SardonicError::corpus(format!("line {line_num}: invalid JSON: {e}"))
        })?;

        let Value::Object(mut object) = value else {
            return Err(SardonicError::corpus(format!(
                "line {line_num}: expected a JSON object"
            )));
        };

        let text = match object.remove(&self.schema.text_field) {
            Some(Value::String(text)) => text,
            Some(Value::Null) => String::new(),
            Some(other) => {
                return Err(SardonicError::corpus(format!(
                    "line {line_num}: field {:?} must be a string, got {other}",
                    self.schema.text_field
                )));
            }
            None => {
                return Err(SardonicError::corpus(format!(
                    "line {line_num}: missing field {:?}",
                    self.schema.text_field
                )));
            }
        };

        let label_value = object.remove(&self.schema.label_field).ok_or_else(|| {
            SardonicError::corpus(format!(
                "line {line_num}: missing field {:?}",
                self.schema.label_field
            ))
        })?;
        let label = parse_label(&label_value).ok_or_else(|| {
            SardonicError::corpus(format!(
                "line {line_num}: label {label_value} is not binary"
            ))
        })?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        let id = match &self.schema.id_field {
            Some(field) => object.remove(field).and_then(|v| stringify(&v)),
            None => None,
        };

        let mut record = Record::new(text, label);
        record.id = id;
        record.extra = extra_columns(object, line_num);
        Ok(Some(record))
    }
}

/// Interpret a JSON value as a binary label.
pub fn parse_label(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 0.0 => Some(false),
            Some(x) if x == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => parse_label_str(s),
        _ => None,
    }
}

/// Interpret a string as a binary label.
pub fn parse_label_str(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn extra_columns(object: Map<String, Value>, line_num: usize) -> std::collections::BTreeMap<String, String> {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            if matches!(value, Value::Object(_) | Value::Array(_)) {
                warn!("line {line_num}: nested field {key:?} stored as JSON text");
            }
            stringify(&value).map(|v| (key, v))
        })
        .collect()
}
