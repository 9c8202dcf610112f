//! Prompt assembly for summarization and document-grounded chat.
//!
//! Prompt text is part of the wire contract with the completion provider: the summary
//! instruction pins the response to a five-field JSON object, and the chat priming pair
//! grounds every answer in the uploaded document. Both are fixed strings; only the
//! document bounds differ between the stateless API profile and the session profile.

use crate::gateway::ChatMessage;

use super::normalize::{
    API_SUMMARY_MAX_CHARS, CHAT_CONTEXT_MAX_CHARS, NormalizeError, SESSION_SUMMARY_MAX_CHARS,
    normalize,
};

const SUMMARY_INSTRUCTION: &str = "Analyze this document and provide a structured summary. Respond ONLY with valid JSON (no markdown, no backticks, no preamble).";

const SUMMARY_SCHEMA: &str = r#"{
  "short": "2-3 sentence summary",
  "detailed": "One detailed paragraph summary",
  "bullets": ["key point 1", "key point 2", "key point 3", "key point 4", "key point 5"],
  "insights": ["insight 1", "insight 2", "insight 3"],
  "keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"]
}"#;

const PRIMING_INSTRUCTION: &str = "You are a helpful assistant answering questions about this document. Only use information from the document to answer questions.";

const PRIMING_ACK: &str =
    "I understand. I will answer questions based only on the document content provided.";

/// Builds provider prompts under a fixed pair of document bounds.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    summary_max_chars: usize,
    chat_context_max_chars: usize,
}

impl PromptBuilder {
    /// Profile used by the stateless endpoints (30k summary bound).
    pub fn api() -> Self {
        Self {
            summary_max_chars: API_SUMMARY_MAX_CHARS,
            chat_context_max_chars: CHAT_CONTEXT_MAX_CHARS,
        }
    }

    /// Profile used by the session pipeline (12k summary bound).
    pub fn session() -> Self {
        Self {
            summary_max_chars: SESSION_SUMMARY_MAX_CHARS,
            chat_context_max_chars: CHAT_CONTEXT_MAX_CHARS,
        }
    }

    /// Build the single-message summarization prompt for `document`.
    pub fn summary_prompt(&self, document: &str) -> Result<ChatMessage, NormalizeError> {
        let bounded = normalize(document, self.summary_max_chars)?;
        Ok(ChatMessage::user(format!(
            "{SUMMARY_INSTRUCTION}\n\nDocument text:\n{}\n\nRequired JSON format:\n{SUMMARY_SCHEMA}",
            bounded.as_str()
        )))
    }

    /// Build the full chat message sequence for one question.
    ///
    /// The sequence is always `[priming user, priming acknowledgement, history in
    /// original order, question]`. The priming pair is re-synthesized on every call:
    /// the provider keeps no context between requests and this integration has no
    /// system-role channel, so the document rides along each time.
    pub fn chat_prompt(
        &self,
        document: &str,
        history: &[ChatMessage],
        question: &str,
    ) -> Result<Vec<ChatMessage>, NormalizeError> {
        let bounded = normalize(document, self.chat_context_max_chars)?;
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(ChatMessage::user(format!(
            "{PRIMING_INSTRUCTION}\n\nDocument:\n{}",
            bounded.as_str()
        )));
        messages.push(ChatMessage::assistant(PRIMING_ACK));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(question));
        Ok(messages)
    }
}
