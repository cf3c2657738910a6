//! AI client: lazy, cached access to the Groq handle
//!
//! The handle is built on first use from the credential source and kept for
//! the life of the `AiClient`. Only successful constructions are cached, so a
//! key exported after a failed call is picked up by the next one.

use std::env;
use std::sync::{Arc, OnceLock};

use crate::config::GroqSettings;
use crate::schemas::groq::ChatCompletionRequest;
use crate::schemas::ChatMessage;
use crate::services::groq::{AiError, GroqClient};

/// Environment variable holding the Groq API key
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Where the API key comes from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read the named environment variable on every construction attempt
    Env(String),
    /// A fixed value, `None` meaning "not configured"
    Static(Option<String>),
}

impl CredentialSource {
    /// The default source: `GROQ_API_KEY`
    pub fn from_env() -> Self {
        CredentialSource::Env(GROQ_API_KEY_ENV.to_string())
    }

    /// Current credential, empty values treated as absent
    pub fn resolve(&self) -> Option<String> {
        let value = match self {
            CredentialSource::Env(name) => env::var(name).ok(),
            CredentialSource::Static(value) => value.clone(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// Process-wide entry point for chat completions
pub struct AiClient {
    config: GroqSettings,
    credential: CredentialSource,
    handle: OnceLock<Arc<GroqClient>>,
}

impl AiClient {
    pub fn new(config: GroqSettings, credential: CredentialSource) -> Self {
        Self {
            config,
            credential,
            handle: OnceLock::new(),
        }
    }

    /// Model used when a caller does not name one
    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// Whether a credential is currently available (cached or resolvable)
    pub fn has_credential(&self) -> bool {
        self.handle.get().is_some() || self.credential.resolve().is_some()
    }

    /// Return the shared handle, building it on first successful call
    ///
    /// Two concurrent first calls may both build a handle; the first one
    /// stored is kept and the other dropped.
    pub fn get_client(&self) -> Result<Arc<GroqClient>, AiError> {
        if let Some(client) = self.handle.get() {
            return Ok(Arc::clone(client));
        }

        let api_key = self.credential.resolve().ok_or(AiError::MissingCredential)?;
        let client = Arc::new(GroqClient::new(api_key, &self.config)?);

        tracing::info!(base_url = %client.base_url(), "Initialized Groq client");

        Ok(Arc::clone(self.handle.get_or_init(|| client)))
    }

    /// Send a single user message and return the first choice's text
    pub async fn simple_prompt(&self, prompt: &str, model: Option<&str>) -> Result<String, AiError> {
        self.chat_completion(vec![ChatMessage::user(prompt)], model).await
    }

    /// Send the conversation verbatim and return the first choice's text
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
    ) -> Result<String, AiError> {
        let client = self.get_client()?;

        let request = ChatCompletionRequest {
            model: model.unwrap_or(&self.config.default_model).to_string(),
            messages,
        };

        let response = client.create_chat_completion(&request).await?;
        response.first_reply().ok_or(AiError::EmptyCompletion)
    }
}
