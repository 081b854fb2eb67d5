use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;

/// Compiles a case-insensitive whole-word matcher for `term`.
///
/// Multi-word terms ("free tier") and punctuated terms ("pay-as-you-go")
/// are matched literally between word boundaries.
pub fn whole_word(term: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(term)))
        .case_insensitive(true)
        .build()
        .map_err(|err| ConfigError::Pattern {
            term: term.to_string(),
            reason: err.to_string(),
        })
}

/// Returns whether `term` occurs in `text` as a whole word, ignoring case.
#[must_use]
pub fn contains_whole_word(term: &str, text: &str) -> bool {
    whole_word(term).is_ok_and(|re| re.is_match(text))
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
