//! Groq service for chat completion calls
//!
//! `GroqClient` is the authenticated handle: an HTTP client bound to one API
//! key and base URL. It holds no other state, so one instance is shared by
//! every request.

use reqwest::Client;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::config::GroqSettings;
use crate::schemas::groq::{ChatCompletionRequest, ChatCompletionResponse, GroqErrorResponse};

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when talking to the AI provider
#[derive(Error, Debug)]
pub enum AiError {
    #[error("GROQ_API_KEY not set")]
    MissingCredential,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Completion contained no choices")]
    EmptyCompletion,
}

impl AiError {
    /// Whether the failure came from the upstream service rather than local configuration
    pub fn is_upstream(&self) -> bool {
        !matches!(self, AiError::MissingCredential)
    }
}

// ============================================================================
// Groq Client
// ============================================================================

/// Authenticated Groq API client
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GroqClient {
    /// Build a client for the given API key
    pub fn new(api_key: impl Into<String>, config: &GroqSettings) -> Result<Self, AiError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AiError::MissingCredential);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /chat/completions
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, AiError> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            url = %url,
            "Calling Groq chat completions API"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GroqErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %body, "Failed to parse Groq response");
            AiError::Parse(e.to_string())
        })?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = ?response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Groq completion received"
            );
        }

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::ChatMessage;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn settings_for(base_url: &str) -> GroqSettings {
        GroqSettings {
            base_url: base_url.to_string(),
            ..GroqSettings::default()
        }
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "llama-3.1-8b-instant".to_string(),
            messages: vec![ChatMessage::user("hi")],
        }
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = GroqClient::new("", &GroqSettings::default());
        assert!(matches!(result, Err(AiError::MissingCredential)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GroqClient::new("key", &settings_for("http://localhost:1234/v1/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GroqClient::new("gsk_secret", &GroqSettings::default()).unwrap();
        assert!(!format!("{:?}", client).contains("gsk_secret"));
    }

    #[tokio::test]
    async fn test_create_chat_completion_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::Json(json!({
                "model": "llama-3.1-8b-instant",
                "messages": [{"role": "user", "content": "hi"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GroqClient::new("test-key", &settings_for(&server.url())).unwrap();
        let response = client.create_chat_completion(&request()).await.unwrap();

        assert_eq!(response.first_reply().as_deref(), Some("hello"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_chat_completion_api_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#)
            .create_async()
            .await;

        let client = GroqClient::new("bad-key", &settings_for(&server.url())).unwrap();
        let err = client.create_chat_completion(&request()).await.unwrap_err();

        match err {
            AiError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_chat_completion_unparseable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = GroqClient::new("key", &settings_for(&server.url())).unwrap();
        let err = client.create_chat_completion(&request()).await.unwrap_err();

        assert!(matches!(err, AiError::Parse(_)));
        assert!(err.is_upstream());
    }
}
