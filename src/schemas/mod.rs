//! Schema definitions module
//!
//! Contains the HTTP API bodies and the upstream Groq wire format.

pub mod ai;
pub mod groq;

pub use ai::{ChatMessage, ErrorResponse, PromptForm, ReplyResponse};
