//! Vocabulary and classifier persisted as one unit.
//!
//! A [`ModelBundle`] can only come into existence by training
//! ([`ModelBundle::train`]) or by loading a file written by
//! [`ModelBundle::save`] ([`ModelBundle::load`]). The classifier is never handed
//! out on its own, so predictions always use the vocabulary it was trained
//! against.
//!
//! File layout (little endian):
//!
//! ```text
//! +--------+---------+-------------+--------+-----------------+
//! | "SRDB" | version | payload len | crc32  | bincode payload |
//! | 4 B    | u32     | u64         | u32    | len bytes       |
//! +--------+---------+-------------+--------+-----------------+
//! ```

use std::fs;
use std::io::{Cursor, ErrorKind, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::{NormalizedText, TextNormalizer};
use crate::error::{Result, SardonicError};
use crate::ml::logistic::{LogisticRegression, LogisticRegressionConfig};
use crate::ml::vectorizer::{self, Vocabulary};
use crate::util::fs::write_atomic;

/// File name of the bundle inside the model directory.
pub const BUNDLE_FILE_NAME: &str = "classifier.bundle";

const MAGIC: &[u8; 4] = b"SRDB";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8 + 4;

/// Facts recorded when a bundle is trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub created_at: DateTime<Utc>,
    pub training_samples: usize,
    pub vocabulary_size: usize,
    pub iterations: usize,
    pub crate_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Payload {
    metadata: BundleMetadata,
    vocabulary: Vocabulary,
    classifier: LogisticRegression,
}

/// A trained classifier paired with its vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    inner: Payload,
}

impl ModelBundle {
    /// Fit a vocabulary on `texts` and train a classifier on the result.
    pub fn train(
        texts: &[NormalizedText],
        labels: &[bool],
        config: &LogisticRegressionConfig,
    ) -> Result<Self> {
        let (vocabulary, features) = vectorizer::fit_transform(texts);
        let classifier = LogisticRegression::fit(config, &features, labels)?;

        let metadata = BundleMetadata {
            created_at: Utc::now(),
            training_samples: texts.len(),
            vocabulary_size: vocabulary.len(),
            iterations: classifier.iterations(),
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
        };
        info!(
            "Trained classifier on {} samples, {} features, {} iterations",
            metadata.training_samples, metadata.vocabulary_size, metadata.iterations
        );

        Ok(ModelBundle {
            inner: Payload {
                metadata,
                vocabulary,
                classifier,
            },
        })
    }

    /// Load a bundle written by [`save`](Self::save).
    ///
    /// A missing file is `ModelNotFound`; anything else wrong with the file is
    /// a `Bundle` error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SardonicError::model_not_found(format!(
                "no model bundle at {}; run `train` first",
                path.display()
            )),
            _ => SardonicError::Io(e),
        })?;

        let bundle = Self::decode(&bytes)
            .map_err(|e| SardonicError::bundle(format!("{}: {e}", path.display())))?;
        info!(
            "Loaded model bundle from {} ({} features)",
            path.display(),
            bundle.inner.vocabulary.len()
        );
        Ok(bundle)
    }

    /// Write the bundle atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        write_atomic(path, &self.encode()?)?;
        info!("Saved model bundle to {}", path.display());
        Ok(())
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.inner.metadata
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.inner.vocabulary
    }

    /// Probability of `true` for each normalized text.
    pub fn predict_proba(&self, texts: &[NormalizedText]) -> Result<Vec<f64>> {
        let features = vectorizer::transform(texts, &self.inner.vocabulary);
        self.inner.classifier.predict_proba(&features)
    }

    /// Predicted label for each normalized text.
    pub fn predict(&self, texts: &[NormalizedText]) -> Result<Vec<bool>> {
        let features = vectorizer::transform(texts, &self.inner.vocabulary);
        self.inner.classifier.predict(&features)
    }

    /// Normalize raw texts, then predict.
    pub fn predict_raw<S>(&self, normalizer: &TextNormalizer, raws: &[S]) -> Result<Vec<bool>>
    where
        S: AsRef<str> + Sync,
    {
        self.predict(&normalizer.normalize_all(raws))
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&self.inner)?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        bytes.write_u64::<LittleEndian>(payload.len() as u64)?;
        bytes.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SardonicError::bundle("file is shorter than the header"));
        }

        let mut cursor = Cursor::new(bytes);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(SardonicError::bundle("not a model bundle (bad magic)"));
        }

        let version = cursor.read_u32::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(SardonicError::bundle(format!(
                "unsupported format version {version}, expected {FORMAT_VERSION}"
            )));
        }

        let length = cursor.read_u64::<LittleEndian>()?;
        let checksum = cursor.read_u32::<LittleEndian>()?;
        let payload = &bytes[HEADER_LEN..];
        if payload.len() as u64 != length {
            return Err(SardonicError::bundle(format!(
                "payload is {} bytes, header says {length}",
                payload.len()
            )));
        }
        if crc32fast::hash(payload) != checksum {
            return Err(SardonicError::bundle("checksum mismatch"));
        }

        let inner: Payload = bincode::deserialize(payload)?;
        if inner.vocabulary.len() != inner.classifier.n_features() {
            return Err(SardonicError::DimensionMismatch {
                expected: inner.classifier.n_features(),
                actual: inner.vocabulary.len(),
            });
        }
        Ok(ModelBundle { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;
    use tempfile::TempDir;

    fn trained() -> (ModelBundle, Vec<NormalizedText>) {
        let raws = [
            ("area man thrilled to attend fourth meeting of the day", true),
            ("nation celebrates as congress finally does nothing", true),
            ("local dad wins argument with toaster", true),
            ("senate passes budget bill after long debate", false),
            ("scientists publish study on ocean temperatures", false),
            ("city council approves new park funding", false),
        ];
        let texts: Vec<NormalizedText> = raws.iter().map(|(t, _)| normalize(t)).collect();
        let labels: Vec<bool> = raws.iter().map(|(_, y)| *y).collect();
        let bundle =
            ModelBundle::train(&texts, &labels, &LogisticRegressionConfig::default()).unwrap();
        (bundle, texts)
    }

    #[test]
    fn test_train_metadata() {
        let (bundle, texts) = trained();
        let metadata = bundle.metadata();
        assert_eq!(metadata.training_samples, texts.len());
        assert_eq!(metadata.vocabulary_size, bundle.vocabulary().len());
        assert_eq!(metadata.crate_version, env!("CARGO_PKG_VERSION"));
        assert!(metadata.iterations >= 1);
    }

    #[test]
    fn test_save_load_reproduces_predictions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join(BUNDLE_FILE_NAME);
        let (bundle, texts) = trained();
        let before = bundle.predict_proba(&texts).unwrap();

        bundle.save(&path).unwrap();
        let loaded = ModelBundle::load(&path).unwrap();

        assert_eq!(loaded, bundle);
        assert_eq!(loaded.predict_proba(&texts).unwrap(), before);
    }

    #[test]
    fn test_predict_raw_matches_predict() {
        let (bundle, _) = trained();
        let raws = ["Area Man <b>thrilled</b>!", "Senate debate continues"];
        let normalizer = TextNormalizer::default();
        let normalized: Vec<NormalizedText> = raws.iter().map(|r| normalize(r)).collect();

        assert_eq!(
            bundle.predict_raw(&normalizer, &raws).unwrap(),
            bundle.predict(&normalized).unwrap()
        );
    }

    #[test]
    fn test_unseen_and_empty_text() {
        let (bundle, _) = trained();
        let predictions = bundle
            .predict(&[normalize(""), normalize("zebra quantum xylophone")])
            .unwrap();
        assert_eq!(predictions[0], predictions[1]);
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ModelBundle::load(dir.path().join(BUNDLE_FILE_NAME)),
            Err(SardonicError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_load_corrupted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BUNDLE_FILE_NAME);
        let (bundle, _) = trained();
        bundle.save(&path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, &bytes).unwrap();
        let err = ModelBundle::load(&path).unwrap_err();
        assert!(matches!(err, SardonicError::Bundle(_)));
        assert!(err.to_string().contains("checksum"));

        fs::write(&path, b"JUNKJUNKJUNKJUNKJUNKJUNK").unwrap();
        assert!(matches!(ModelBundle::load(&path), Err(SardonicError::Bundle(_))));

        fs::write(&path, b"SRDB").unwrap();
        assert!(matches!(ModelBundle::load(&path), Err(SardonicError::Bundle(_))));
    }

    #[test]
    fn test_load_wrong_version() {
        let (bundle, _) = trained();
        let mut bytes = bundle.encode().unwrap();
        bytes[4] = 99;
        assert!(
            ModelBundle::decode(&bytes)
                .unwrap_err()
                .to_string()
                .contains("version 99")
        );
    }
}
