//! Shared fixtures for unit tests

use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use serde_json::json;

use crate::config::{GroqSettings, Settings};
use crate::frontend::FrontendAssets;
use crate::middleware::auth::SessionClaims;
use crate::server::AppState;
use crate::services::{AiClient, CredentialSource};

pub const TEST_SESSION_SECRET: &str = "test-session-secret";

/// Mint a session cookie value valid for `ttl_secs` (negative for expired)
pub fn session_token(user_id: &str, ttl_secs: i64) -> String {
    let exp = (get_current_timestamp() as i64 + ttl_secs).max(0) as u64;
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SESSION_SECRET.as_bytes()),
    )
    .expect("encode session token")
}

/// `Cookie` header value carrying a fresh session
pub fn session_cookie(user_id: &str) -> String {
    format!("sessionid={}", session_token(user_id, 3600))
}

/// Settings with login enabled and a known secret
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.session_secret = Some(TEST_SESSION_SECRET.to_string());
    settings
}

/// Build state pointing the AI client at `base_url`
pub fn test_state(base_url: &str, api_key: Option<&str>) -> AppState {
    test_state_with(test_settings(), base_url, api_key)
}

pub fn test_state_with(settings: Settings, base_url: &str, api_key: Option<&str>) -> AppState {
    let groq = GroqSettings {
        base_url: base_url.to_string(),
        ..settings.groq.clone()
    };
    let ai = AiClient::new(groq, CredentialSource::Static(api_key.map(str::to_string)));
    let assets = FrontendAssets {
        asset_url: "https://cdn.example.com".to_string(),
        debug: false,
        js_file: "assets/main-abc123.js".to_string(),
        css_file: "assets/main-def456.css".to_string(),
    };
    AppState::from_parts(settings, ai, assets)
}

/// Minimal Groq chat completion body with one choice
pub fn completion_body(text: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "llama-3.1-8b-instant",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 5, "completion_tokens": 1, "total_tokens": 6}
    })
    .to_string()
}
