//! Completion gateway for OpenRouter-compatible chat APIs.
//!
//! Every upstream interaction in the server funnels through [`CompletionClient`], so the
//! pipeline can be exercised in tests with a stub while production wires in
//! [`OpenRouterClient`]. The client issues a single attempt per call; retry policy is left
//! to callers and, in practice, to the humans clicking the retry button.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::get_config;

/// Participant that authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Message authored by the end user (also used for priming instructions).
    User,
    /// Message authored by the model.
    Assistant,
}

/// Single message in a chat exchange, in the wire format OpenRouter expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
}

impl ChatMessage {
    /// Build a user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Build an assistant-authored message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call knobs forwarded to the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionOptions {
    /// Upper bound on generated tokens. `None` leaves the provider default in place.
    pub max_tokens: Option<u32>,
}

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider could not be reached or the request timed out.
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider answered with a non-success status.
    #[error("Completion provider rejected the request ({status}): {body}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Response body, useful for operator diagnostics.
        body: String,
    },
    /// Provider response could not be decoded into a completion.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Interface implemented by chat completion providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request a single completion for the given conversation.
    ///
    /// Returns the assistant message content exactly as the provider produced it;
    /// callers decide whether to trim or parse further.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String, CompletionError>;
}

/// Build the production completion client from global configuration.
pub fn get_completion_client() -> Box<dyn CompletionClient + Send + Sync> {
    Box::new(OpenRouterClient::from_config())
}

/// OpenRouter-backed [`CompletionClient`].
pub struct OpenRouterClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    site_url: String,
    site_name: String,
}

impl OpenRouterClient {
    /// Construct a client from the loaded [`crate::config::Config`].
    pub fn from_config() -> Self {
        let config = get_config();
        let http = Client::builder()
            .user_agent("docuchat/completions")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to construct reqwest::Client for completions");
        Self {
            http,
            base_url: config.openrouter_base_url.clone(),
            api_key: config.openrouter_api_key.clone(),
            model: config.completion_model.clone(),
            site_url: config.site_url.clone(),
            site_name: config.site_name.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<String, CompletionError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: options.max_tokens,
        };

        let mut request = self
            .http
            .post(self.endpoint())
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.site_name)
            .json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|error| {
            CompletionError::ProviderUnavailable(format!(
                "failed to reach {}: {error}",
                self.base_url
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Rejected { status, body });
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            if error.is_timeout() {
                CompletionError::ProviderUnavailable(format!(
                    "timed out reading completion response: {error}"
                ))
            } else {
                CompletionError::MalformedResponse(format!(
                    "failed to decode completion response: {error}"
                ))
            }
        })?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                CompletionError::MalformedResponse("response contained no choices".into())
            })?;

        Ok(choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn test_client(server: &MockServer, api_key: Option<String>) -> OpenRouterClient {
        OpenRouterClient {
            http: Client::builder()
                .user_agent("docuchat-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            api_key,
            model: "mistralai/mistral-7b-instruct:free".into(),
            site_url: "http://localhost:5175".into(),
            site_name: "DocuChat AI".into(),
        }
    }

    #[tokio::test]
    async fn sends_attribution_headers_and_returns_content() {
        let server = MockServer::start_async().await;
        let client = test_client(&server, Some("sk-test".into()));

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .header("http-referer", "http://localhost:5175")
                    .header("x-title", "DocuChat AI")
                    .body_contains("\"model\":\"mistralai/mistral-7b-instruct:free\"")
                    .body_contains("\"role\":\"user\"");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Hi there"}}]
                }));
            })
            .await;

        let content = client
            .complete(vec![ChatMessage::user("Hello")], CompletionOptions::default())
            .await
            .expect("completion");

        mock.assert();
        assert_eq!(content, "Hi there");
    }

    #[tokio::test]
    async fn forwards_max_tokens_when_set() {
        let server = MockServer::start_async().await;
        let client = test_client(&server, Some("sk-test".into()));

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .body_contains("\"max_tokens\":1000");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "ok"}}]
                }));
            })
            .await;

        client
            .complete(
                vec![ChatMessage::user("Hello")],
                CompletionOptions {
                    max_tokens: Some(1000),
                },
            )
            .await
            .expect("completion");

        mock.assert();
    }

    #[tokio::test]
    async fn omits_authorization_header_without_api_key() {
        let server = MockServer::start_async().await;
        let client = test_client(&server, None);

        let authorized_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header_exists("authorization");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "authed"}}]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "anonymous"}}]
                }));
            })
            .await;

        let content = client
            .complete(vec![ChatMessage::user("Hello")], CompletionOptions::default())
            .await
            .expect("completion");

        assert_eq!(content, "anonymous");
        assert_eq!(authorized_mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn maps_error_status_to_rejected() {
        let server = MockServer::start_async().await;
        let client = test_client(&server, Some("sk-test".into()));

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429).body("rate limited");
            })
            .await;

        let error = client
            .complete(vec![ChatMessage::user("Hello")], CompletionOptions::default())
            .await
            .expect_err("error response");

        match error {
            CompletionError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn maps_timeout_to_provider_unavailable() {
        let server = MockServer::start_async().await;
        let client = OpenRouterClient {
            http: Client::builder()
                .user_agent("docuchat-test")
                .timeout(Duration::from_millis(100))
                .build()
                .expect("client"),
            ..test_client(&server, Some("sk-test".into()))
        };

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .delay(Duration::from_millis(750))
                    .json_body(json!({
                        "choices": [{"message": {"role": "assistant", "content": "late"}}]
                    }));
            })
            .await;

        let error = client
            .complete(vec![ChatMessage::user("Hello")], CompletionOptions::default())
            .await
            .expect_err("timed out request");

        assert!(matches!(error, CompletionError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn flags_response_without_choices() {
        let server = MockServer::start_async().await;
        let client = test_client(&server, Some("sk-test".into()));

        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let error = client
            .complete(vec![ChatMessage::user("Hello")], CompletionOptions::default())
            .await
            .expect_err("empty choices");

        assert!(matches!(error, CompletionError::MalformedResponse(_)));
    }
}
