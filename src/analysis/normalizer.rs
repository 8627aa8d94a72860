//! Text normalization shared by training and inference.
//!
//! [`TextNormalizer`] turns a raw headline into a [`NormalizedText`] by running
//! a fixed chain of char filters:
//!
//! ```text
//! raw ─► markup ─► whitespace ─► case ─► accents ─► contractions ─► non_alphanumeric ─► collapse ─► trim
//! ```
//!
//! 1. `markup`: parse as HTML, drop `<script>`/`<iframe>` content and all tags,
//!    collapse runs of line breaks into one `\n`.
//! 2. `whitespace`: every `\n`, `\t` and `\r` becomes a space.
//! 3. `case`: lowercase everything.
//! 4. `accents`: NFKD decomposition, non-ASCII code points dropped.
//! 5. `contractions`: whole-word expansion from
//!    [`ENGLISH_CONTRACTIONS`](crate::analysis::lexicon::ENGLISH_CONTRACTIONS).
//! 6. `non_alphanumeric`: anything other than an ASCII letter, digit or
//!    whitespace becomes a space.
//! 7. `collapse` + `trim`: whitespace runs become a single space, then the ends
//!    are trimmed.
//!
//! There is exactly one pipeline. The trainer and every inference path call the
//! same [`normalize`] function, so features seen at prediction time are built
//! from text normalized byte-for-byte the same way as at training time.
//!
//! # Examples
//!
//! ```
//! use sardonic::analysis::normalizer::normalize;
//!
//! let text = normalize("Can't believe <script>alert(1)</script> this happened!!");
//! assert_eq!(text.as_str(), "can not believe this happened");
//!
//! // Normalization is a fixed point on its own output.
//! assert_eq!(normalize(text.as_str()), text);
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use rayon::prelude::*;
use serde::Serialize;

use crate::analysis::char_filter::{
    AsciiFoldingCharFilter, CharFilter, HtmlStripCharFilter, LowercaseCharFilter,
    MappingCharFilter, PatternReplaceCharFilter, TrimCharFilter,
};
use crate::analysis::lexicon::ENGLISH_CONTRACTIONS;
use crate::error::Result;

static ENGLISH: LazyLock<TextNormalizer> = LazyLock::new(|| {
    TextNormalizer::english().expect("built-in normalization patterns are valid")
});

/// Normalize `raw` with the shared English pipeline.
pub fn normalize(raw: &str) -> NormalizedText {
    ENGLISH.normalize(raw)
}

/// Check the output invariant: lowercase ASCII letters, digits and single
/// interior spaces only.
pub fn is_canonical(text: &str) -> bool {
    let allowed = text
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b' ');
    allowed && !text.starts_with(' ') && !text.ends_with(' ') && !text.contains("  ")
}

/// Text produced by [`TextNormalizer`].
///
/// Only the normalizer constructs values of this type, so holding a
/// `NormalizedText` means the text went through the shared pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    fn new(text: String) -> Self {
        debug_assert!(is_canonical(&text), "non-canonical output {text:?}");
        NormalizedText(text)
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether nothing survived normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace-delimited tokens, in order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed raw-text to [`NormalizedText`] pipeline.
#[derive(Clone)]
pub struct TextNormalizer {
    stages: Vec<(&'static str, Arc<dyn CharFilter>)>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        ENGLISH.clone()
    }
}

impl TextNormalizer {
    /// Build the English normalization pipeline.
    pub fn english() -> Result<Self> {
        let contractions = MappingCharFilter::new(ENGLISH_CONTRACTIONS.iter().copied())?
            .with_whole_words(true);

        let stages: Vec<(&'static str, Arc<dyn CharFilter>)> = vec![
            ("markup", Arc::new(HtmlStripCharFilter::new())),
            (
                "whitespace",
                Arc::new(PatternReplaceCharFilter::new(r"[\n\t\r]", " ")?),
            ),
            ("case", Arc::new(LowercaseCharFilter::new())),
            (
                "accents",
                Arc::new(AsciiFoldingCharFilter::new().with_lowercase(true)),
            ),
            ("contractions", Arc::new(contractions)),
            (
                "non_alphanumeric",
                Arc::new(PatternReplaceCharFilter::new(r"[^a-zA-Z0-9\s]", " ")?),
            ),
            // `\s+` rather than ` +`: vertical tab and form feed survive the
            // earlier stages and must not leak into the output.
            ("collapse", Arc::new(PatternReplaceCharFilter::new(r"\s+", " ")?)),
            ("trim", Arc::new(TrimCharFilter::new())),
        ];

        Ok(Self { stages })
    }

    /// Normalize a single raw text. Never fails; the result may be empty.
    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let text = self
            .stages
            .iter()
            .fold(raw.to_string(), |text, (_, filter)| filter.filter(&text));
        NormalizedText::new(text)
    }

    /// Normalize many texts, preserving order.
    pub fn normalize_all<S>(&self, raws: &[S]) -> Vec<NormalizedText>
    where
        S: AsRef<str> + Sync,
    {
        raws.par_iter().map(|raw| self.normalize(raw.as_ref())).collect()
    }

    /// Run the pipeline and return the output of every stage.
    pub fn trace(&self, raw: &str) -> Vec<(&'static str, String)> {
        let mut text = raw.to_string();
        let mut steps = Vec::with_capacity(self.stages.len());
        for (stage, filter) in &self.stages {
            text = filter.filter(&text);
            steps.push((*stage, text.clone()));
        }
        steps
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(stage, _)| *stage).collect()
    }
}

impl fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNormalizer")
            .field(
                "stages",
                &self
                    .stages
                    .iter()
                    .map(|(stage, filter)| format!("{stage}:{}", filter.name()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
