//! Text analysis module for Sardonic.
//!
//! Raw headlines are turned into canonical token strings by a chain of
//! [`char_filter::CharFilter`]s assembled in [`normalizer::TextNormalizer`].

pub mod char_filter;
pub mod lexicon;
pub mod normalizer;

// Re-export commonly used types
pub use normalizer::{NormalizedText, TextNormalizer, is_canonical, normalize};
