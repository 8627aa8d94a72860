use std::collections::BTreeMap;

use aho_corasick::{AhoCorasick, Anchored, Input, Match, MatchKind, StartKind};

use super::CharFilter;
use crate::error::{Result, SardonicError};

/// A char filter that replaces lexicon entries with their mapped text.
///
/// Matching is leftmost-longest, so `"y'all'd"` wins over `"y'all"` when both
/// are keys. With whole-word matching enabled a key only matches when it is not
/// glued to a neighbouring letter or digit; `"can't"` is expanded in
/// `"(can't)"` but not in `"scan't"`. When the longest key at a position is
/// glued to a neighbour, shorter keys starting there are tried before moving
/// on, so `"can't'vex"` still expands `"can't"` although `"can't've"` matched
/// first. Text outside any match passes through unchanged.
#[derive(Clone, Debug)]
pub struct MappingCharFilter {
    ac: AhoCorasick,
    replacements: Vec<String>,
    whole_words: bool,
}

impl MappingCharFilter {
    /// Build a mapping filter. Duplicate keys keep their last replacement.
    pub fn new<I, K, V>(mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        // BTreeMap gives the automaton a stable pattern order.
        let mapping: BTreeMap<String, String> = mapping
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if mapping.contains_key("") {
            return Err(SardonicError::invalid_config(
                "mapping keys must not be empty",
            ));
        }

        let (keys, replacements): (Vec<String>, Vec<String>) = mapping.into_iter().unzip();

        let ac = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .start_kind(StartKind::Both)
            .build(&keys)
            .map_err(|e| SardonicError::invalid_config(format!("mapping automaton: {e}")))?;

        Ok(Self {
            ac,
            replacements,
            whole_words: false,
        })
    }

    /// Only replace keys that stand as whole words.
    pub fn with_whole_words(mut self, whole_words: bool) -> Self {
        self.whole_words = whole_words;
        self
    }

    /// Number of lexicon entries.
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    /// Whether the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }

    fn is_word_bounded(input: &str, start: usize, end: usize) -> bool {
        let before = input[..start].chars().next_back();
        let after = input[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    }

    /// Longest word-bounded key starting where `found` starts, if any.
    fn bounded_match(&self, input: &str, found: Match) -> Option<Match> {
        let mut candidate = found;
        while !Self::is_word_bounded(input, candidate.start(), candidate.end()) {
            let shorter = Input::new(input)
                .range(candidate.start()..candidate.end() - 1)
                .anchored(Anchored::Yes);
            candidate = self.ac.find(shorter)?;
        }
        Some(candidate)
    }
}

impl CharFilter for MappingCharFilter {
    fn filter(&self, input: &str) -> String {
        let mut output = String::with_capacity(input.len());
        let mut last_match_end = 0;
        let mut search_from = 0;

        while search_from <= input.len() {
            let Some(found) = self.ac.find(Input::new(input).range(search_from..)) else {
                break;
            };

            let m = if self.whole_words {
                match self.bounded_match(input, found) {
                    Some(m) => m,
                    None => {
                        // Retry from the next character after the rejected start.
                        let step = input[found.start()..].chars().next().map_or(1, char::len_utf8);
                        search_from = found.start() + step;
                        continue;
                    }
                }
            } else {
                found
            };

            output.push_str(&input[last_match_end..m.start()]);
            output.push_str(&self.replacements[m.pattern().as_usize()]);
            last_match_end = m.end();
            search_from = m.end();
        }

        output.push_str(&input[last_match_end..]);
        output
    }

    fn name(&self) -> &'static str {
        "mapping"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_char_filter() {
        let filter = MappingCharFilter::new([("ph", "f"), ("qu", "k")]).unwrap();
        assert_eq!(filter.filter("phone queue"), "fone keue");
    }

    #[test]
    fn test_mapping_expansion_and_deletion() {
        let filter = MappingCharFilter::new([("a", "aaa"), ("foo", "")]).unwrap();
        assert_eq!(filter.filter("bab"), "baaab");
        assert_eq!(filter.filter("xfooy"), "xy");
    }

    #[test]
    fn test_mapping_longest_match() {
        let filter = MappingCharFilter::new([("ab", "1"), ("abc", "2")]).unwrap();
        assert_eq!(filter.filter("abc"), "2");
    }

    #[test]
    fn test_whole_words() {
        let filter = MappingCharFilter::new([("can't", "can not")])
            .unwrap()
            .with_whole_words(true);
        assert_eq!(filter.filter("i can't"), "i can not");
        assert_eq!(filter.filter("(can't)"), "(can not)");
        assert_eq!(filter.filter("scan't"), "scan't");
        assert_eq!(filter.filter("can'tx"), "can'tx");
    }

    #[test]
    fn test_whole_words_retries_after_rejection() {
        let filter = MappingCharFilter::new([("aa", "X")])
            .unwrap()
            .with_whole_words(true);
        // The first candidate at offset 1 is glued to "b"; the word at the end is not.
        assert_eq!(filter.filter("baa aa"), "baa X");
    }

    #[test]
    fn test_whole_words_falls_back_to_shorter_key() {
        let filter = MappingCharFilter::new([("can't", "can not"), ("can't've", "can not have")])
            .unwrap()
            .with_whole_words(true);
        assert_eq!(filter.filter("can't've"), "can not have");
        assert_eq!(filter.filter("can't'vex"), "can not'vex");
        assert_eq!(filter.filter("xcan't've"), "xcan't've");
    }

    #[test]
    fn test_mapping_multibyte() {
        let filter = MappingCharFilter::new([("壱", "1")]).unwrap();
        assert_eq!(filter.filter("第壱位"), "第1位");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(MappingCharFilter::new([("", "x")]).is_err());
    }
}
