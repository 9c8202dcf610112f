//! HTTP surface for DocuChat.
//!
//! This module exposes a compact Axum router with the following endpoints:
//!
//! - `GET /` – Liveness probe, answers with a fixed plain-text banner.
//! - `POST /api/summarize` – Summarize raw text into a structured five-field summary.
//! - `POST /api/chat` – Forward a chat message sequence to the completion provider verbatim.
//! - `POST /api/sessions` – Upload a document, summarize it, and open a chat session.
//! - `GET /api/sessions/{id}` – Read session metadata, summary, and visible history.
//! - `POST /api/sessions/{id}/chat` – Ask a question grounded in the session's document.
//! - `DELETE /api/sessions/{id}` – Delete a session.
//! - `GET /metrics` – Observe usage counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Error bodies are part of the wire contract with existing clients: validation and
//! failure messages are fixed strings, and every failure answers `{ "error": … }`
//! (plus `"raw"` for summary parse failures).

use crate::extract::DocumentUpload;
use crate::gateway::ChatMessage;
use crate::pipeline::{DocumentSummary, PipelineApi, PipelineError};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use time::OffsetDateTime;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Build the HTTP router exposing the DocuChat API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: PipelineApi + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/summarize", post(summarize::<S>))
        .route("/api/chat", post(chat::<S>))
        .route("/api/sessions", post(create_session::<S>))
        .route(
            "/api/sessions/:id",
            get(view_session::<S>).delete(delete_session::<S>),
        )
        .route("/api/sessions/:id/chat", post(session_chat::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(cors)
        .with_state(service)
}

/// Liveness banner, a fixed string existing deployments probe for.
async fn root() -> &'static str {
    "Backend Server is running"
}

/// Request body for `POST /api/summarize`.
#[derive(Deserialize)]
struct SummarizeRequest {
    /// Raw document text to summarize.
    text: String,
}

/// Summarize raw text into a structured summary.
///
/// The response is the bare summary object. A missing or unreadable body maps to the
/// fixed validation message rather than a framework rejection.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    body: Option<Json<SummarizeRequest>>,
) -> Result<Json<DocumentSummary>, ApiError>
where
    S: PipelineApi,
{
    let Some(Json(request)) = body else {
        return Err(ApiError::TextRequired);
    };
    let summary = service
        .summarize_text(&request.text)
        .await
        .map_err(summarize_error)?;
    Ok(Json(summary))
}

fn summarize_error(error: PipelineError) -> ApiError {
    match error {
        PipelineError::Normalize(_) => ApiError::TextRequired,
        PipelineError::SummaryParse(parse) => ApiError::SummaryParse { raw: parse.raw },
        _ => ApiError::SummaryGeneration,
    }
}

/// Request body for `POST /api/chat`.
#[derive(Deserialize)]
struct ChatRequest {
    /// Ordered message sequence forwarded to the provider as-is.
    messages: Vec<ChatMessage>,
}

/// Response body for chat endpoints.
#[derive(Serialize)]
struct ChatResponse {
    content: String,
}

/// Forward a caller-supplied conversation to the provider.
async fn chat<S>(
    State(service): State<Arc<S>>,
    body: Option<Json<ChatRequest>>,
) -> Result<Json<ChatResponse>, ApiError>
where
    S: PipelineApi,
{
    let Some(Json(request)) = body else {
        return Err(ApiError::MessagesRequired);
    };
    let content = service
        .chat_completion(request.messages)
        .await
        .map_err(|_| ApiError::ChatGeneration)?;
    Ok(Json(ChatResponse { content }))
}

/// Request body for `POST /api/sessions`.
#[derive(Deserialize)]
struct SessionCreateRequest {
    /// Original file name.
    file_name: String,
    /// Declared MIME type, checked against the upload allow-list.
    mime_type: String,
    /// Upload content; the document text itself for `text/plain`.
    content: String,
}

/// Success response for `POST /api/sessions`.
#[derive(Serialize)]
struct SessionCreatedResponse {
    session_id: Uuid,
    summary: DocumentSummary,
}

/// Upload a document and open a chat session around it.
async fn create_session<S>(
    State(service): State<Arc<S>>,
    body: Option<Json<SessionCreateRequest>>,
) -> Result<Json<SessionCreatedResponse>, ApiError>
where
    S: PipelineApi,
{
    let Some(Json(request)) = body else {
        return Err(ApiError::InvalidUpload(
            "Please upload a valid file (PDF, DOC, DOCX, TXT, JPG, PNG)".to_string(),
        ));
    };
    let created = service
        .create_session(DocumentUpload {
            file_name: request.file_name,
            mime_type: request.mime_type,
            content: request.content,
        })
        .await
        .map_err(ingest_error)?;
    Ok(Json(SessionCreatedResponse {
        session_id: created.session_id,
        summary: created.summary,
    }))
}

fn ingest_error(error: PipelineError) -> ApiError {
    match error {
        PipelineError::Extract(extract) => ApiError::InvalidUpload(extract.to_string()),
        PipelineError::Normalize(_) => ApiError::TextRequired,
        PipelineError::SummaryParse(parse) => ApiError::SummaryParse { raw: parse.raw },
        _ => ApiError::SummaryGeneration,
    }
}

/// Success response for `GET /api/sessions/{id}`.
#[derive(Serialize)]
struct SessionViewResponse {
    session_id: Uuid,
    file_name: String,
    created_at: String,
    summary: DocumentSummary,
    history: Vec<ChatMessage>,
}

/// Read a session's metadata, summary, and visible history.
async fn view_session<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<SessionViewResponse>, ApiError>
where
    S: PipelineApi,
{
    let id = parse_session_id(&id)?;
    let view = service.session_view(id).await.map_err(session_error)?;
    Ok(Json(SessionViewResponse {
        session_id: view.session_id,
        file_name: view.file_name,
        created_at: format_rfc3339(view.created_at),
        summary: view.summary,
        history: view.history,
    }))
}

/// Request body for `POST /api/sessions/{id}/chat`.
#[derive(Deserialize)]
struct SessionChatRequest {
    /// Question to answer from the session's document.
    question: String,
}

/// Ask one question within a session.
///
/// Returns `200` with the recorded assistant content even when the provider failed;
/// the apology text is the answer in that case.
async fn session_chat<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
    body: Option<Json<SessionChatRequest>>,
) -> Result<Json<ChatResponse>, ApiError>
where
    S: PipelineApi,
{
    let id = parse_session_id(&id)?;
    let Some(Json(request)) = body else {
        return Err(ApiError::QuestionRequired);
    };
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::QuestionRequired);
    }
    let content = service
        .session_chat(id, question)
        .await
        .map_err(session_error)?;
    Ok(Json(ChatResponse { content }))
}

/// Delete a session.
async fn delete_session<S>(
    State(service): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: PipelineApi,
{
    let id = parse_session_id(&id)?;
    service.reset_session(id).await.map_err(session_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// A malformed id can never match a live session, so it reads as absent rather than
/// as a framework-level rejection.
fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::SessionNotFound)
}

fn session_error(error: PipelineError) -> ApiError {
    match error {
        PipelineError::SessionNotFound => ApiError::SessionNotFound,
        _ => ApiError::ChatGeneration,
    }
}

/// Response body for `GET /metrics`.
#[derive(Serialize)]
struct MetricsResponse {
    documents_summarized: u64,
    questions_answered: u64,
    summary_parse_failures: u64,
    upstream_failures: u64,
}

/// Return a concise usage snapshot.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsResponse>
where
    S: PipelineApi,
{
    let snapshot = service.metrics_snapshot();
    Json(MetricsResponse {
        documents_summarized: snapshot.documents_summarized,
        questions_answered: snapshot.questions_answered,
        summary_parse_failures: snapshot.summary_parse_failures,
        upstream_failures: snapshot.upstream_failures,
    })
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/api/summarize",
                description: "Summarize raw text. Response is the bare summary object with \"short\", \"detailed\", \"bullets\", \"insights\", and \"keywords\".",
                request_example: Some(json!({
                    "text": "Document contents"
                })),
            },
            CommandDescriptor {
                name: "chat",
                method: "POST",
                path: "/api/chat",
                description: "Forward a chat message sequence to the completion provider verbatim. Response returns { \"content\": string }.",
                request_example: Some(json!({
                    "messages": [
                        { "role": "user", "content": "Hello" }
                    ]
                })),
            },
            CommandDescriptor {
                name: "create_session",
                method: "POST",
                path: "/api/sessions",
                description: "Upload a document, summarize it, and open a chat session. Response returns { \"session_id\": string, \"summary\": object }.",
                request_example: Some(json!({
                    "file_name": "report.txt",
                    "mime_type": "text/plain",
                    "content": "Document contents"
                })),
            },
            CommandDescriptor {
                name: "view_session",
                method: "GET",
                path: "/api/sessions/{id}",
                description: "Return session metadata, the generated summary, and the visible chat history.",
                request_example: None,
            },
            CommandDescriptor {
                name: "session_chat",
                method: "POST",
                path: "/api/sessions/{id}/chat",
                description: "Answer one question grounded in the session's document. Response returns { \"content\": string }.",
                request_example: Some(json!({
                    "question": "What is the main finding?"
                })),
            },
            CommandDescriptor {
                name: "delete_session",
                method: "DELETE",
                path: "/api/sessions/{id}",
                description: "Delete a session and its conversation history.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return usage counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

/// Current timestamp formatting for session views.
fn format_rfc3339(moment: OffsetDateTime) -> String {
    moment
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Errors surfaced by the HTTP boundary, with display bodies clients parse verbatim.
enum ApiError {
    /// `text` was missing or empty.
    TextRequired,
    /// `messages` was missing or not an array of chat messages.
    MessagesRequired,
    /// `question` was missing or blank.
    QuestionRequired,
    /// Upload failed validation; the message names the rule that rejected it.
    InvalidUpload(String),
    /// No session under the requested id.
    SessionNotFound,
    /// Provider answered but the summary could not be parsed.
    SummaryParse {
        /// Post-strip model output, echoed for diagnostics.
        raw: String,
    },
    /// Summary generation failed upstream.
    SummaryGeneration,
    /// Chat completion failed upstream.
    ChatGeneration,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::TextRequired
            | ApiError::MessagesRequired
            | ApiError::QuestionRequired
            | ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::SummaryParse { .. }
            | ApiError::SummaryGeneration
            | ApiError::ChatGeneration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::TextRequired => "Text is required",
            ApiError::MessagesRequired => "Messages array is required",
            ApiError::QuestionRequired => "Question is required",
            ApiError::InvalidUpload(message) => message,
            ApiError::SessionNotFound => "Session not found",
            ApiError::SummaryParse { .. } => "Failed to parse summary response",
            ApiError::SummaryGeneration => "Failed to generate summaries",
            ApiError::ChatGeneration => "Failed to generate chat response",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::SummaryParse { raw } => {
                json!({ "error": "Failed to parse summary response", "raw": raw })
            }
            other => json!({ "error": other.message() }),
        };
        (status, Json(body)).into_response()
    }
}
