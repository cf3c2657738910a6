//! Groq chat completion schema definitions
//!
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint. Only the
//! fields this service sends or reads are modelled; everything else in the
//! upstream payload is ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::schemas::ai::ChatMessage;

// ============================================================================
// Request Types
// ============================================================================

/// Chat completion request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model ID (e.g., "llama-3.1-8b-instant")
    pub model: String,

    /// Messages in the conversation, forwarded verbatim
    pub messages: Vec<ChatMessage>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Chat completion response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any choice was returned
    ///
    /// A choice whose content is `null` counts as an empty reply.
    pub fn first_reply(&self) -> Option<String> {
        self.choices
            .first()
            .map(|choice| choice.message.content.clone().unwrap_or_default())
    }
}

/// A single completion candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,

    pub message: AssistantMessage,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message produced by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,

    #[serde(default)]
    pub content: Option<String>,
}

/// Token accounting reported by Groq
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error envelope returned on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqErrorResponse {
    pub error: GroqErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqErrorDetail {
    pub message: String,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    #[serde(default)]
    pub code: Option<String>,
}
