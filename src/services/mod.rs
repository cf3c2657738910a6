//! Services module
//!
//! Contains the AI client and the upstream Groq integration.

pub mod ai_client;
pub mod groq;

pub use ai_client::{AiClient, CredentialSource, GROQ_API_KEY_ENV};
pub use groq::{AiError, GroqClient};
