//! Hard character bounds applied to document text before prompting.
//!
//! The cutoffs are part of the prompt-assembly contract that existing clients of the
//! completion API rely on, not tuning knobs, so they live here as plain constants rather
//! than in configuration.

use thiserror::Error;

/// Bound applied to document text for the stateless summarize endpoint.
pub const API_SUMMARY_MAX_CHARS: usize = 30_000;
/// Bound applied to document text when summarizing during session ingest.
pub const SESSION_SUMMARY_MAX_CHARS: usize = 12_000;
/// Bound applied to the document text injected into every chat priming pair.
pub const CHAT_CONTEXT_MAX_CHARS: usize = 10_000;

/// Errors produced while preparing text for prompting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// Input was empty or contained only whitespace.
    #[error("Text is required")]
    EmptyInput,
}

/// Document text bounded for prompt assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Borrow the bounded text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and take the bounded text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Bound `raw` to at most `max_chars` characters.
///
/// Truncation counts `char`s, never bytes, so multi-byte characters are kept whole.
/// There is no word-boundary awareness; the cut lands mid-word when the bound does.
/// Input at or under the bound passes through unchanged, including surrounding
/// whitespace; only the emptiness check trims.
pub fn normalize(raw: &str, max_chars: usize) -> Result<NormalizedText, NormalizeError> {
    if raw.trim().is_empty() {
        return Err(NormalizeError::EmptyInput);
    }
    let text = match raw.char_indices().nth(max_chars) {
        Some((cut, _)) => raw[..cut].to_string(),
        None => raw.to_string(),
    };
    Ok(NormalizedText(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_passes_through_untrimmed() {
        let text = normalize("  hello world  ", 100).expect("non-empty input");
        assert_eq!(text.as_str(), "  hello world  ");
    }

    #[test]
    fn input_at_bound_is_unchanged() {
        let input = "a".repeat(10);
        let text = normalize(&input, 10).expect("non-empty input");
        assert_eq!(text.as_str(), input);
    }

    #[test]
    fn long_input_is_cut_to_exactly_max_chars() {
        let input = "a".repeat(50);
        let text = normalize(&input, 10).expect("non-empty input");
        assert_eq!(text.as_str().chars().count(), 10);
    }

    #[test]
    fn truncation_never_splits_multibyte_characters() {
        let input = "é".repeat(20);
        let text = normalize(&input, 7).expect("non-empty input");
        assert_eq!(text.as_str(), "é".repeat(7));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(normalize("", 100), Err(NormalizeError::EmptyInput));
    }

    #[test]
    fn whitespace_only_input_is_rejected() {
        assert_eq!(normalize(" \n\t ", 100), Err(NormalizeError::EmptyInput));
    }
}
