//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::frontend::FrontendAssets;
use crate::middleware::auth::SessionVerifier;
use crate::services::{AiClient, CredentialSource};

/// Shared application state
///
/// Cheap to clone; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// AI client holding the lazily built Groq handle
    pub ai: Arc<AiClient>,

    /// Script and stylesheet names for the index page
    pub assets: Arc<FrontendAssets>,

    /// Session cookie verifier (absent when login is not required)
    pub sessions: Option<Arc<SessionVerifier>>,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create the state used by the running server
    ///
    /// Fails when the build manifest cannot be resolved outside debug mode.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        tracing::debug!(debug = settings.debug, "Resolving front-end assets");
        let assets = FrontendAssets::from_settings(&settings)?;

        let ai = AiClient::new(settings.groq.clone(), CredentialSource::from_env());
        if !ai.has_credential() {
            tracing::warn!("GROQ_API_KEY is not set; AI endpoints will fail until it is");
        }

        let state = Self::from_parts(settings, ai, assets);
        tracing::info!("Application state initialized successfully");
        Ok(state)
    }

    /// Assemble state from already-built parts
    pub fn from_parts(settings: Settings, ai: AiClient, assets: FrontendAssets) -> Self {
        let sessions = if settings.auth.require_login {
            settings
                .auth
                .session_secret
                .as_deref()
                .map(|secret| Arc::new(SessionVerifier::new(secret, &settings.auth)))
        } else {
            tracing::debug!("Session authentication disabled");
            None
        };

        Self {
            settings: Arc::new(settings),
            ai: Arc::new(ai),
            assets: Arc::new(assets),
            sessions,
            start_time: Instant::now(),
        }
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Check if session authentication is required
    pub fn requires_login(&self) -> bool {
        self.settings.auth.require_login
    }
}
