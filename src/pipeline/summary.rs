//! Structured summary parsing for model output.
//!
//! Providers are instructed to answer with bare JSON, but instruction-following is
//! best-effort: fenced code blocks are the dominant failure shape. The parser strips
//! fence markers as a lenient textual pass before handing the remainder to a strict
//! typed parse. Everything else (preamble prose, truncated JSON, missing keys) is a
//! reported failure carrying the cleaned text, never a silently defaulted summary.

use thiserror::Error;

use super::types::DocumentSummary;

/// Raised when model output cannot be parsed into a [`DocumentSummary`].
#[derive(Debug, Error)]
#[error("Failed to parse summary response")]
pub struct SummaryParseError {
    /// Model output after fence stripping, surfaced for diagnostics.
    pub raw: String,
    /// Underlying JSON error.
    #[source]
    pub source: serde_json::Error,
}

/// Parse raw model output into a validated [`DocumentSummary`].
///
/// All five fields must be present with the right types; unknown extra fields are
/// tolerated. Array lengths are prompted as 5/3/5 but only logged when they differ.
pub fn parse_summary(raw: &str) -> Result<DocumentSummary, SummaryParseError> {
    let cleaned = strip_code_fences(raw.trim());
    match serde_json::from_str::<DocumentSummary>(&cleaned) {
        Ok(summary) => {
            if summary.bullets.len() != 5
                || summary.insights.len() != 3
                || summary.keywords.len() != 5
            {
                tracing::debug!(
                    bullets = summary.bullets.len(),
                    insights = summary.insights.len(),
                    keywords = summary.keywords.len(),
                    "Summary cardinality differs from prompt hints"
                );
            }
            Ok(summary)
        }
        Err(source) => Err(SummaryParseError {
            raw: cleaned,
            source,
        }),
    }
}

/// Remove fenced code-block markers wherever they appear.
///
/// Every ```` ```json ```` and every ```` ``` ````, each with one optional trailing
/// newline, is deleted textually. This is not a markdown parse; a marker inside a
/// string value would be removed too, which is accepted for this integration.
fn strip_code_fences(text: &str) -> String {
    let without_json = remove_marker(text, "```json");
    let without_bare = remove_marker(&without_json, "```");
    without_bare.trim().to_string()
}

fn remove_marker(text: &str, marker: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(position) = rest.find(marker) {
        result.push_str(&rest[..position]);
        rest = &rest[position + marker.len()..];
        if let Some(after_newline) = rest.strip_prefix('\n') {
            rest = after_newline;
        }
    }
    result.push_str(rest);
    result
}
