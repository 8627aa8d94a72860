use super::CharFilter;

/// A char filter that removes leading and trailing whitespace.
#[derive(Clone, Debug, Default)]
pub struct TrimCharFilter;

impl TrimCharFilter {
    /// Create a new trim char filter.
    pub fn new() -> Self {
        TrimCharFilter
    }
}

impl CharFilter for TrimCharFilter {
    fn filter(&self, input: &str) -> String {
        input.trim().to_string()
    }

    fn name(&self) -> &'static str {
        "trim"
    }
}
