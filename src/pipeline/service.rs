//! Pipeline service coordinating extraction, prompting, completion, and sessions.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::extract::{DocumentUpload, TextExtractor, get_text_extractor};
use crate::gateway::{ChatMessage, CompletionClient, CompletionOptions, get_completion_client};
use crate::metrics::{MetricsSnapshot, UsageMetrics};
use crate::pipeline::conversation::{APOLOGY, Conversation};
use crate::pipeline::normalize::{CHAT_CONTEXT_MAX_CHARS, normalize};
use crate::pipeline::prompt::PromptBuilder;
use crate::pipeline::session::{SessionEntry, SessionStore};
use crate::pipeline::summary::parse_summary;
use crate::pipeline::types::{
    Document, DocumentSummary, PipelineError, SessionCreated, SessionView,
};

/// Token cap applied to every session-pipeline completion.
const SESSION_MAX_TOKENS: u32 = 1000;

/// Coordinates the full document pipeline: extraction, summarization, and chat.
///
/// The service owns long-lived handles to the completion client, the text extractor,
/// the session store, and the metrics registry. Construct it once near process start
/// and share it through an `Arc`.
pub struct PipelineService {
    completion_client: Box<dyn CompletionClient + Send + Sync>,
    extractor: Box<dyn TextExtractor + Send + Sync>,
    sessions: SessionStore,
    metrics: Arc<UsageMetrics>,
}

/// Abstraction over the pipeline consumed by the HTTP surface.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Summarize raw text through the stateless API profile.
    async fn summarize_text(&self, text: &str) -> Result<DocumentSummary, PipelineError>;

    /// Forward a caller-supplied message sequence to the provider verbatim.
    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, PipelineError>;

    /// Validate, extract, and summarize an upload, creating a chat session.
    async fn create_session(
        &self,
        upload: DocumentUpload,
    ) -> Result<SessionCreated, PipelineError>;

    /// Answer one question within a session, recording the turn.
    async fn session_chat(
        &self,
        session_id: Uuid,
        question: &str,
    ) -> Result<String, PipelineError>;

    /// Read a session's metadata, summary, and visible history.
    async fn session_view(&self, session_id: Uuid) -> Result<SessionView, PipelineError>;

    /// Delete a session and everything it owns.
    async fn reset_session(&self, session_id: Uuid) -> Result<(), PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PipelineService {
    /// Build the production service from global configuration.
    pub fn from_config() -> Self {
        Self::with_components(get_completion_client(), get_text_extractor())
    }

    /// Build a service around explicit components.
    pub fn with_components(
        completion_client: Box<dyn CompletionClient + Send + Sync>,
        extractor: Box<dyn TextExtractor + Send + Sync>,
    ) -> Self {
        Self {
            completion_client,
            extractor,
            sessions: SessionStore::new(),
            metrics: Arc::new(UsageMetrics::new()),
        }
    }

    /// Summarize raw text through the stateless API profile (30k bound, no token cap).
    pub async fn summarize_text(&self, text: &str) -> Result<DocumentSummary, PipelineError> {
        tracing::info!(chars = text.chars().count(), "Summarize request received");
        let summary = self
            .generate_summary(PromptBuilder::api(), text, CompletionOptions::default())
            .await?;
        tracing::info!("Summary generated");
        Ok(summary)
    }

    /// Forward a message sequence to the provider without priming or truncation.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<String, PipelineError> {
        tracing::info!(messages = messages.len(), "Chat completion requested");
        let content = match self
            .completion_client
            .complete(messages, CompletionOptions::default())
            .await
        {
            Ok(content) => content,
            Err(error) => {
                self.metrics.record_upstream_failure();
                tracing::warn!(error = %error, "Chat completion failed");
                return Err(error.into());
            }
        };
        self.metrics.record_answer();
        Ok(content)
    }

    /// Ingest an upload: extract text, summarize it, and open a session.
    ///
    /// Any failure along the way leaves no session behind.
    pub async fn create_session(
        &self,
        upload: DocumentUpload,
    ) -> Result<SessionCreated, PipelineError> {
        tracing::info!(
            file_name = %upload.file_name,
            mime_type = %upload.mime_type,
            "Ingesting upload"
        );
        let raw_text = self.extractor.extract(&upload).await?;
        let summary = self
            .generate_summary(
                PromptBuilder::session(),
                &raw_text,
                CompletionOptions {
                    max_tokens: Some(SESSION_MAX_TOKENS),
                },
            )
            .await?;

        let truncated_text = normalize(&raw_text, CHAT_CONTEXT_MAX_CHARS)?.into_inner();
        let document = Document {
            id: Uuid::new_v4(),
            raw_text,
            truncated_text,
        };
        let entry = self
            .sessions
            .insert(SessionEntry {
                id: Uuid::new_v4(),
                file_name: upload.file_name,
                created_at: OffsetDateTime::now_utc(),
                document,
                summary: summary.clone(),
                conversation: Mutex::new(Conversation::new()),
            })
            .await;

        tracing::info!(session_id = %entry.id, file_name = %entry.file_name, "Session created");
        Ok(SessionCreated {
            session_id: entry.id,
            summary,
        })
    }

    /// Answer one question grounded in the session's document.
    ///
    /// A provider failure does not fail the turn: the fixed apology is recorded as the
    /// answer and returned, and the session stays usable.
    pub async fn session_chat(
        &self,
        session_id: Uuid,
        question: &str,
    ) -> Result<String, PipelineError> {
        let entry = self
            .sessions
            .get(&session_id)
            .await
            .ok_or(PipelineError::SessionNotFound)?;

        // Held across the provider call: a second question on this session queues
        // behind the in-flight turn.
        let mut conversation = entry.conversation.lock().await;
        let messages = PromptBuilder::session().chat_prompt(
            &entry.document.truncated_text,
            conversation.prompt_history(),
            question,
        )?;

        let answer = match self
            .completion_client
            .complete(
                messages,
                CompletionOptions {
                    max_tokens: Some(SESSION_MAX_TOKENS),
                },
            )
            .await
        {
            Ok(answer) => {
                self.metrics.record_answer();
                answer
            }
            Err(error) => {
                self.metrics.record_upstream_failure();
                tracing::warn!(
                    session_id = %session_id,
                    error = %error,
                    "Completion failed, recording apology turn"
                );
                APOLOGY.to_string()
            }
        };

        conversation.record_turn(question, answer.clone());
        tracing::info!(
            session_id = %session_id,
            history_len = conversation.visible().len(),
            "Chat turn recorded"
        );
        Ok(answer)
    }

    /// Read a session's metadata, summary, and visible history.
    pub async fn session_view(&self, session_id: Uuid) -> Result<SessionView, PipelineError> {
        let entry = self
            .sessions
            .get(&session_id)
            .await
            .ok_or(PipelineError::SessionNotFound)?;
        let history = entry.conversation.lock().await.visible().to_vec();
        Ok(SessionView {
            session_id: entry.id,
            file_name: entry.file_name.clone(),
            created_at: entry.created_at,
            summary: entry.summary.clone(),
            history,
        })
    }

    /// Delete a session and everything it owns.
    pub async fn reset_session(&self, session_id: Uuid) -> Result<(), PipelineError> {
        if self.sessions.remove(&session_id).await.is_none() {
            return Err(PipelineError::SessionNotFound);
        }
        tracing::info!(session_id = %session_id, "Session deleted");
        Ok(())
    }

    /// Return the current usage metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn generate_summary(
        &self,
        builder: PromptBuilder,
        text: &str,
        options: CompletionOptions,
    ) -> Result<DocumentSummary, PipelineError> {
        let prompt = builder.summary_prompt(text)?;
        let completion = match self.completion_client.complete(vec![prompt], options).await {
            Ok(completion) => completion,
            Err(error) => {
                self.metrics.record_upstream_failure();
                tracing::warn!(error = %error, "Summary completion failed");
                return Err(error.into());
            }
        };
        match parse_summary(&completion) {
            Ok(summary) => {
                self.metrics.record_summary();
                Ok(summary)
            }
            Err(error) => {
                self.metrics.record_parse_failure();
                tracing::warn!(error = %error, "Summary response failed to parse");
                Err(error.into())
            }
        }
    }
}

#[async_trait]
impl PipelineApi for PipelineService {
    async fn summarize_text(&self, text: &str) -> Result<DocumentSummary, PipelineError> {
        PipelineService::summarize_text(self, text).await
    }

    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, PipelineError> {
        PipelineService::chat_completion(self, messages).await
    }

    async fn create_session(
        &self,
        upload: DocumentUpload,
    ) -> Result<SessionCreated, PipelineError> {
        PipelineService::create_session(self, upload).await
    }

    async fn session_chat(
        &self,
        session_id: Uuid,
        question: &str,
    ) -> Result<String, PipelineError> {
        PipelineService::session_chat(self, session_id, question).await
    }

    async fn session_view(&self, session_id: Uuid) -> Result<SessionView, PipelineError> {
        PipelineService::session_view(self, session_id).await
    }

    async fn reset_session(&self, session_id: Uuid) -> Result<(), PipelineError> {
        PipelineService::reset_session(self, session_id).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PipelineService::metrics_snapshot(self)
    }
}
