use unicode_normalization::UnicodeNormalization;

use super::CharFilter;

/// A char filter that reduces text to ASCII.
///
/// The input is put through Unicode compatibility decomposition (NFKD), which
/// splits accented letters into a base letter plus combining marks and expands
/// compatibility forms such as ligatures. Every non-ASCII code point left
/// afterwards (combining marks, scripts with no ASCII form) is dropped, not
/// replaced.
///
/// Some compatibility characters decompose to uppercase letters (`ℌ` becomes
/// `H`). With [`with_lowercase`](Self::with_lowercase) enabled the produced
/// ASCII is lowercased again so that a lowercased input stays lowercased.
#[derive(Clone, Debug, Default)]
pub struct AsciiFoldingCharFilter {
    lowercase: bool,
}

impl AsciiFoldingCharFilter {
    /// Create a new ASCII folding char filter.
    pub fn new() -> Self {
        Self { lowercase: false }
    }

    /// Lowercase ASCII letters produced by decomposition.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }
}

impl CharFilter for AsciiFoldingCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            return if self.lowercase {
                input.to_ascii_lowercase()
            } else {
                input.to_string()
            };
        }

        input
            .nfkd()
            .filter(char::is_ascii)
            .map(|c| {
                if self.lowercase {
                    c.to_ascii_lowercase()
                } else {
                    c
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "ascii_folding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_removed() {
        let filter = AsciiFoldingCharFilter::new();
        assert_eq!(filter.filter("café naïve résumé"), "cafe naive resume");
        // Decomposed input: "e" + U+0301
        assert_eq!(filter.filter("cafe\u{0301}"), "cafe");
    }

    #[test]
    fn test_non_ascii_dropped() {
        let filter = AsciiFoldingCharFilter::new();
        assert_eq!(filter.filter("tokyo 東京"), "tokyo ");
        assert_eq!(filter.filter("\u{2019}"), "");
    }

    #[test]
    fn test_compatibility_forms() {
        let filter = AsciiFoldingCharFilter::new();
        // Ligature "fi" and fullwidth "Ａ"
        assert_eq!(filter.filter("\u{fb01}ne \u{ff21}"), "fine A");
    }

    #[test]
    fn test_lowercase_after_decomposition() {
        let filter = AsciiFoldingCharFilter::new().with_lowercase(true);
        assert_eq!(filter.filter("\u{210c}ello"), "hello");
        assert_eq!(filter.filter("ABC"), "abc");
    }
}
