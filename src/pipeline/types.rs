//! Core data types and error definitions for the document pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::extract::ExtractError;
use crate::gateway::{ChatMessage, CompletionError};

use super::normalize::NormalizeError;
use super::summary::SummaryParseError;

/// Structured summary of one document, in the shape the provider is prompted for.
///
/// All five fields are required; a response missing any of them is a parse failure
/// rather than a partially filled summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Two-to-three sentence summary.
    pub short: String,
    /// One detailed paragraph.
    pub detailed: String,
    /// Key points, prompted as five.
    pub bullets: Vec<String>,
    /// Notable insights, prompted as three.
    pub insights: Vec<String>,
    /// Salient keywords, prompted as five.
    pub keywords: Vec<String>,
}

/// An ingested document owned by a session.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier assigned at ingest.
    pub id: Uuid,
    /// Full extracted text.
    pub raw_text: String,
    /// Text bounded to the chat-context cutoff, used to ground every chat prompt.
    pub truncated_text: String,
}

/// Outcome of a successful session ingest.
#[derive(Debug, Clone)]
pub struct SessionCreated {
    /// Identifier of the new session.
    pub session_id: Uuid,
    /// Summary generated during ingest.
    pub summary: DocumentSummary,
}

/// Read-only view of one live session.
#[derive(Debug, Clone)]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// File name supplied at upload.
    pub file_name: String,
    /// Moment the session was created.
    pub created_at: OffsetDateTime,
    /// Summary generated during ingest.
    pub summary: DocumentSummary,
    /// Visible conversation history, greeting included.
    pub history: Vec<ChatMessage>,
}

/// Errors emitted by the document pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Document text failed pre-prompt validation.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    /// Upload failed validation or extraction.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// Completion provider call failed.
    #[error("Completion request failed: {0}")]
    Completion(#[from] CompletionError),
    /// Provider answered but the summary could not be parsed.
    #[error(transparent)]
    SummaryParse(#[from] SummaryParseError),
    /// No session exists under the requested identifier.
    #[error("Session not found")]
    SessionNotFound,
}
