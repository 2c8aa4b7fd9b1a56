//! Search functionality for filtering listed entities.
//!
//! This module encapsulates the search/matching logic, allowing the underlying
//! implementation to be changed without affecting the rest of the codebase.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// A matcher for fuzzy searching text.
///
/// This wraps the underlying fuzzy matching implementation, providing a simple
/// interface that can be used throughout the application.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// Create a new matcher instance.
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default(),
        }
    }

    /// Check if the text matches the pattern using fuzzy matching.
    ///
    /// Matching is case-insensitive and allows non-consecutive characters,
    /// so "acct" matches a client called "account-console".
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        let pattern_lower = pattern.to_lowercase();
        self.inner.fuzzy_match(text, &pattern_lower).is_some()
    }

    /// Check if any of the provided texts match the pattern.
    pub fn matches_any<'a>(&self, texts: impl IntoIterator<Item = &'a str>, pattern: &str) -> bool {
        texts.into_iter().any(|text| self.matches(text, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_match() {
        let matcher = Matcher::new();

        assert!(matcher.matches("account-console", "acct"));
        assert!(matcher.matches("realm-management", "rlmgmt"));
        assert!(matcher.matches("production", "prd"));

        // Exact match
        assert!(matcher.matches("master", "master"));

        // Case-insensitive
        assert!(matcher.matches("ACCOUNT-CONSOLE", "acct"));
        assert!(matcher.matches("account-console", "ACCT"));

        // No match
        assert!(!matcher.matches("master", "xyz"));
    }

    #[test]
    fn test_matches_any() {
        let matcher = Matcher::new();

        let texts = vec!["admin-cli", "broker", "account"];
        assert!(matcher.matches_any(texts.iter().map(|s| *s), "brok"));
        assert!(matcher.matches_any(texts.iter().map(|s| *s), "acc"));
        assert!(!matcher.matches_any(texts.iter().map(|s| *s), "xyz"));
    }
}
