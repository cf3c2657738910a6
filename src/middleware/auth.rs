//! Session authentication middleware
//!
//! Sessions are issued by the identity service as an HS256-signed JWT in a
//! cookie. This middleware only verifies that cookie; it never creates or
//! refreshes sessions.

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthSettings;
use crate::error::ApiError;
use crate::server::state::AppState;

// ============================================================================
// Principal
// ============================================================================

/// Claims carried by the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// The authenticated user, injected into request extensions
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub anonymous: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            anonymous: true,
        }
    }
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            anonymous: false,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No session cookie")]
    MissingSession,

    #[error("Invalid session: {0}")]
    InvalidSession(#[from] jsonwebtoken::errors::Error),

    #[error("Session verification is not configured")]
    NotConfigured,
}

// ============================================================================
// Verifier
// ============================================================================

/// Verifies session cookies against the shared signing secret
pub struct SessionVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    cookie_name: String,
}

impl SessionVerifier {
    pub fn new(secret: &str, auth: &AuthSettings) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            cookie_name: auth.session_cookie_name.clone(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Decode and validate a session token (signature and expiry)
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(Principal::from(data.claims))
    }

    /// Find the session cookie in the request headers and verify it
    pub fn authenticate(&self, headers: &axum::http::HeaderMap) -> Result<Principal, AuthError> {
        let jar = CookieJar::from_headers(headers);
        let cookie = jar.get(&self.cookie_name).ok_or(AuthError::MissingSession)?;
        self.verify(cookie.value())
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Middleware requiring a valid session
///
/// Unauthenticated page loads are redirected to the login page with a
/// `next` parameter; other requests get a 401 JSON body.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !state.requires_login() {
        request.extensions_mut().insert(Principal::anonymous());
        return next.run(request).await;
    }

    let result = match &state.sessions {
        Some(verifier) => verifier.authenticate(request.headers()),
        None => Err(AuthError::NotConfigured),
    };

    match result {
        Ok(principal) => {
            tracing::debug!(user_id = %principal.user_id, "Session authenticated");
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(AuthError::NotConfigured) => {
            tracing::error!("Login required but no session secret configured");
            login_challenge(&request, &state.settings.auth.login_url)
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %request.uri().path(),
                "Rejected unauthenticated request"
            );
            login_challenge(&request, &state.settings.auth.login_url)
        }
    }
}

/// Redirect page loads to the login page, refuse everything else
fn login_challenge(request: &Request<Body>, login_url: &str) -> Response {
    if wants_html(request) {
        let next = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        (StatusCode::FOUND, [(header::LOCATION, login_target(login_url, next))]).into_response()
    } else {
        ApiError::Unauthorized.into_response()
    }
}

fn wants_html(request: &Request<Body>) -> bool {
    request.method() == Method::GET
        && request
            .headers()
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false)
}

fn login_target(login_url: &str, next: &str) -> String {
    format!("{}?next={}", login_url, urlencoding::encode(next))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{session_token, TEST_SESSION_SECRET};
    use axum::http::{HeaderMap, HeaderValue};

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(TEST_SESSION_SECRET, &AuthSettings::default())
    }

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_session() {
        let token = session_token("user-42", 3600);
        let principal = verifier()
            .authenticate(&cookie_headers(&format!("csrftoken=abc; sessionid={}", token)))
            .unwrap();

        assert_eq!(principal.user_id, "user-42");
        assert!(!principal.anonymous);
    }

    #[test]
    fn test_missing_cookie() {
        let err = verifier()
            .authenticate(&cookie_headers("other=1"))
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingSession));
    }

    #[test]
    fn test_expired_session() {
        let token = session_token("user-42", -3600);
        let err = verifier().verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSession(_)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = session_token("user-42", 3600);
        let other = SessionVerifier::new("a-different-secret", &AuthSettings::default());
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_custom_cookie_name() {
        let auth = AuthSettings {
            session_cookie_name: "forge_session".to_string(),
            ..AuthSettings::default()
        };
        let verifier = SessionVerifier::new(TEST_SESSION_SECRET, &auth);
        let token = session_token("u", 3600);

        assert!(verifier
            .authenticate(&cookie_headers(&format!("sessionid={}", token)))
            .is_err());
        assert!(verifier
            .authenticate(&cookie_headers(&format!("forge_session={}", token)))
            .is_ok());
    }

    #[test]
    fn test_login_target() {
        assert_eq!(login_target("/login/", "/"), "/login/?next=%2F");
        assert_eq!(
            login_target("/login/", "/?a=%C3%A9&x=1"),
            "/login/?next=%2F%3Fa%3D%25C3%25A9%26x%3D1"
        );
        assert_eq!(login_target("/login/", "/a b#c"), "/login/?next=%2Fa%20b%23c");
    }

    #[test]
    fn test_wants_html() {
        let page = Request::get("/")
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Body::empty())
            .unwrap();
        assert!(wants_html(&page));

        let api = Request::post("/api/ai/chat/")
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();
        assert!(!wants_html(&api));

        let fetch = Request::get("/").body(Body::empty()).unwrap();
        assert!(!wants_html(&fetch));
    }
}
