//! Pattern matching utilities for prompt detection.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Color and erase-line escape sequences (`ESC [ ... m` / `ESC [ ... K`).
static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[mK]").expect("built-in ANSI pattern"));

/// Trait for prompt matching - regex by default, extensible for custom parsers.
pub trait PromptMatcher: Send + Sync {
    /// Returns byte offset where the match starts, or None if no match.
    fn find_match(&self, data: &[u8]) -> Option<usize>;

    /// Check if the data matches the pattern.
    fn is_match(&self, data: &[u8]) -> bool {
        self.find_match(data).is_some()
    }
}

impl PromptMatcher for Regex {
    fn find_match(&self, data: &[u8]) -> Option<usize> {
        self.find(data).map(|m| m.start())
    }
}

/// Remove color escape sequences from raw output.
pub fn strip_ansi(data: &[u8]) -> Cow<'_, [u8]> {
    ANSI_ESCAPE.replace_all(data, &b""[..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_prompt_matcher() {
        let pattern = Regex::new(r"Router#\s*$").unwrap();
        assert!(pattern.is_match(b"Router# "));
        assert_eq!(PromptMatcher::find_match(&pattern, b"out\nRouter#"), Some(4));
        assert!(!PromptMatcher::is_match(&pattern, b"Router> "));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(&*strip_ansi(b"\x1b[32mGreen\x1b[0m text\x1b[K"), b"Green text");
        assert!(matches!(strip_ansi(b"plain"), Cow::Borrowed(_)));
    }
}
