//! Markup stripping backed by `scraper` (servo's html5ever).
//!
//! The input is parsed as an HTML fragment. Text inside removed elements
//! (`<script>` and `<iframe>` by default) is discarded together with the tags;
//! every other text node is kept in document order and all tags, attributes
//! and comments disappear. Character references are decoded by the parser.
//!
//! html5ever never rejects input: malformed markup is recovered best-effort and
//! whatever cannot be interpreted as markup comes back as text. A `<` with no
//! `>` after it cannot open a tag, so it is escaped before parsing and the text
//! behind it survives (`"why 5<x is true"` keeps `"x is true"`).

use std::borrow::Cow;

use scraper::{Html, Node};

use super::CharFilter;

const DEFAULT_REMOVED_ELEMENTS: &[&str] = &["script", "iframe"];

/// A char filter that strips HTML markup and returns visible text.
#[derive(Clone, Debug)]
pub struct HtmlStripCharFilter {
    removed_elements: Vec<String>,
}

impl Default for HtmlStripCharFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlStripCharFilter {
    /// Create a filter that removes `<script>` and `<iframe>` content.
    pub fn new() -> Self {
        Self::with_removed_elements(DEFAULT_REMOVED_ELEMENTS.iter().copied())
    }

    /// Create a filter that removes the content of the given elements.
    pub fn with_removed_elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            removed_elements: elements
                .into_iter()
                .map(|e| e.into().to_ascii_lowercase())
                .collect(),
        }
    }

    fn is_removed(&self, name: &str) -> bool {
        self.removed_elements.iter().any(|e| e == name)
    }

    /// Extract visible text from `input`.
    fn extract_text(&self, input: &str) -> String {
        let fragment = Html::parse_fragment(&escape_unclosed_tags(input));
        let mut text = String::with_capacity(input.len());

        for node in fragment.tree.root().descendants() {
            if let Node::Text(chunk) = node.value() {
                let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                    Node::Element(element) => self.is_removed(element.name()),
                    _ => false,
                });
                if !hidden {
                    text.push_str(chunk);
                }
            }
        }

        text
    }
}

/// Escape every `<` that follows the last `>` of `input`.
fn escape_unclosed_tags(input: &str) -> Cow<'_, str> {
    let tail_start = input.rfind('>').map_or(0, |i| i + 1);
    let tail = &input[tail_start..];
    if !tail.contains('<') {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 8);
    escaped.push_str(&input[..tail_start]);
    escaped.push_str(&tail.replace('<', "&lt;"));
    Cow::Owned(escaped)
}

/// Collapse every run of `\r`/`\n` characters into one `\n`.
fn collapse_line_breaks(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut in_break = false;

    for c in input.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                output.push('\n');
                in_break = true;
            }
        } else {
            output.push(c);
            in_break = false;
        }
    }

    output
}

impl CharFilter for HtmlStripCharFilter {
    fn filter(&self, input: &str) -> String {
        collapse_line_breaks(&self.extract_text(input))
    }

    fn name(&self) -> &'static str {
        "html_strip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed() {
        let filter = HtmlStripCharFilter::new();
        assert_eq!(
            filter.filter("Can't believe <script>alert(1)</script> this happened!!"),
            "Can't believe  this happened!!"
        );
    }

    #[test]
    fn test_iframe_removed() {
        let filter = HtmlStripCharFilter::new();
        let output = filter.filter("before<iframe src=\"x\">inner</iframe>after");
        assert_eq!(output, "beforeafter");
    }

    #[test]
    fn test_tags_and_attributes_dropped() {
        let filter = HtmlStripCharFilter::new();
        let output = filter.filter("<p class=\"lead\">Hello <b>bold</b> world</p><!-- note -->");
        assert_eq!(output, "Hello bold world");
    }

    #[test]
    fn test_entities_decoded() {
        let filter = HtmlStripCharFilter::new();
        assert_eq!(filter.filter("fish &amp; chips"), "fish & chips");
    }

    #[test]
    fn test_line_breaks_collapsed() {
        let filter = HtmlStripCharFilter::new();
        assert_eq!(filter.filter("one\r\n\r\ntwo\nthree"), "one\ntwo\nthree");
    }

    #[test]
    fn test_malformed_markup_is_best_effort() {
        let filter = HtmlStripCharFilter::new();
        assert_eq!(filter.filter("<div><span>unclosed"), "unclosed");
        assert_eq!(filter.filter("a < b"), "a < b");
        assert_eq!(filter.filter(""), "");
    }

    #[test]
    fn test_unclosed_tag_kept_as_text() {
        let filter = HtmlStripCharFilter::new();
        assert_eq!(filter.filter("why 5<x is true"), "why 5<x is true");
        assert_eq!(
            filter.filter("stocks rise as x<y and markets cheer"),
            "stocks rise as x<y and markets cheer"
        );
        assert_eq!(filter.filter("a <b c"), "a <b c");
        assert_eq!(filter.filter("<b>bold</b> then 1<2"), "bold then 1<2");
        assert_eq!(filter.filter("trailing <"), "trailing <");
    }

    #[test]
    fn test_escape_only_touches_tail() {
        assert!(matches!(escape_unclosed_tags("<b>x</b>"), Cow::Borrowed(_)));
        assert_eq!(escape_unclosed_tags("<i>a</i> b<c"), "<i>a</i> b&lt;c");
    }

    #[test]
    fn test_custom_removed_elements() {
        let filter = HtmlStripCharFilter::with_removed_elements(["STYLE"]);
        let output = filter.filter("<style>p {}</style>text<script>x</script>");
        assert_eq!(output, "textx");
    }
}
