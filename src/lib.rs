//! Partwise Forge server library
//!
//! Serves the authenticated front-end shell and relays prompts from it to
//! the Groq chat completion API.

// Public modules
pub mod api;
pub mod config;
pub mod error;
pub mod frontend;
pub mod logging;
pub mod middleware;
pub mod schemas;
pub mod server;
pub mod services;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::ApiError;
pub use server::App;
pub use services::AiClient;
