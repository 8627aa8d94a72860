//! Char filter implementations for text normalization.
//!
//! A char filter maps a whole string to a new string. The
//! [`TextNormalizer`](crate::analysis::normalizer::TextNormalizer) is nothing
//! more than an ordered chain of these filters, so every normalization stage
//! lives here as its own type and can be tested in isolation.
//!
//! # Available Filters
//!
//! - [`html_strip::HtmlStripCharFilter`] - Markup removal (drops `<script>`/`<iframe>` content)
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//! - [`lowercase::LowercaseCharFilter`] - Unicode case folding
//! - [`ascii_folding::AsciiFoldingCharFilter`] - NFKD decomposition down to ASCII
//! - [`mapping::MappingCharFilter`] - Whole-word lexicon replacement (contractions)
//! - [`trim::TrimCharFilter`] - Leading/trailing whitespace removal
//!
//! # Examples
//!
//! ```
//! use sardonic::analysis::char_filter::CharFilter;
//! use sardonic::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"[\n\t\r]", " ").unwrap();
//! assert_eq!(filter.filter("a\tb\nc"), "a b c");
//! ```

/// Trait for character filters that transform text before tokenization.
///
/// Filters must be pure: the same input always yields the same output, with
/// no dependence on whether the caller is training or serving predictions.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod ascii_folding;
pub mod html_strip;
pub mod lowercase;
pub mod mapping;
pub mod pattern_replace;
pub mod trim;

pub use ascii_folding::AsciiFoldingCharFilter;
pub use html_strip::HtmlStripCharFilter;
pub use lowercase::LowercaseCharFilter;
pub use mapping::MappingCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
pub use trim::TrimCharFilter;
