//! Same-origin protection for state-changing requests
//!
//! The API endpoints are authenticated by cookie, so a page on another
//! origin could otherwise post to them with the user's session. Browsers
//! attach `Origin` (or at least `Referer`) to such requests; the value must
//! name this host or one of the configured trusted origins.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::server::state::AppState;

pub const CSRF_FAILURE_MESSAGE: &str = "CSRF verification failed. Request origin not trusted.";

/// Outcome of checking one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginCheck {
    /// Safe method, or no browser origin headers at all
    Skipped,
    Trusted,
    Rejected(String),
}

/// Middleware enforcing same-origin on non-safe methods
pub async fn verify_origin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.settings.csrf.enabled {
        return next.run(request).await;
    }

    match check_origin(request.method(), request.headers(), &state.settings.csrf.trusted_origins) {
        OriginCheck::Rejected(origin) => {
            tracing::warn!(
                origin = %origin,
                path = %request.uri().path(),
                "Rejected cross-origin request"
            );
            ApiError::Forbidden(CSRF_FAILURE_MESSAGE.to_string()).into_response()
        }
        _ => next.run(request).await,
    }
}

/// Decide whether a request may proceed
pub fn check_origin(method: &Method, headers: &HeaderMap, trusted: &[String]) -> OriginCheck {
    if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE) {
        return OriginCheck::Skipped;
    }

    let Some(source) = header_str(headers, header::ORIGIN.as_str())
        .or_else(|| header_str(headers, header::REFERER.as_str()))
    else {
        return OriginCheck::Skipped;
    };

    let host = header_str(headers, header::HOST.as_str());
    if origin_matches(source, host, trusted) {
        OriginCheck::Trusted
    } else {
        OriginCheck::Rejected(source.to_string())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn origin_matches(source: &str, host: Option<&str>, trusted: &[String]) -> bool {
    // "null" origins come from sandboxed frames and file:// pages
    let Ok(uri) = source.parse::<Uri>() else {
        return false;
    };
    let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
        return false;
    };

    if host.is_some_and(|h| h.eq_ignore_ascii_case(authority.as_str())) {
        return true;
    }

    let origin = format!("{}://{}", scheme, authority);
    trusted.iter().any(|t| t.eq_ignore_ascii_case(&origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_safe_methods_skip() {
        let h = headers(&[(header::ORIGIN, "https://evil.example")]);
        assert_eq!(check_origin(&Method::GET, &h, &[]), OriginCheck::Skipped);
    }

    #[test]
    fn test_same_host_trusted() {
        let h = headers(&[
            (header::HOST, "forge.example.com"),
            (header::ORIGIN, "https://forge.example.com"),
        ]);
        assert_eq!(check_origin(&Method::POST, &h, &[]), OriginCheck::Trusted);
    }

    #[test]
    fn test_same_host_with_port() {
        let h = headers(&[
            (header::HOST, "localhost:8000"),
            (header::ORIGIN, "http://localhost:8000"),
        ]);
        assert_eq!(check_origin(&Method::POST, &h, &[]), OriginCheck::Trusted);
    }

    #[test]
    fn test_cross_origin_rejected() {
        let h = headers(&[
            (header::HOST, "forge.example.com"),
            (header::ORIGIN, "https://evil.example"),
        ]);
        assert_eq!(
            check_origin(&Method::POST, &h, &[]),
            OriginCheck::Rejected("https://evil.example".to_string())
        );
    }

    #[test]
    fn test_trusted_origin_list() {
        let h = headers(&[
            (header::HOST, "localhost:8000"),
            (header::ORIGIN, "http://localhost:5173"),
        ]);
        let trusted = vec!["http://localhost:5173".to_string()];
        assert_eq!(check_origin(&Method::POST, &h, &trusted), OriginCheck::Trusted);
    }

    #[test]
    fn test_referer_fallback() {
        let h = headers(&[
            (header::HOST, "forge.example.com"),
            (header::REFERER, "https://forge.example.com/some/page?x=1"),
        ]);
        assert_eq!(check_origin(&Method::POST, &h, &[]), OriginCheck::Trusted);

        let h = headers(&[
            (header::HOST, "forge.example.com"),
            (header::REFERER, "https://evil.example/attack"),
        ]);
        assert!(matches!(check_origin(&Method::POST, &h, &[]), OriginCheck::Rejected(_)));
    }

    #[test]
    fn test_null_origin_rejected() {
        let h = headers(&[(header::HOST, "forge.example.com"), (header::ORIGIN, "null")]);
        assert!(matches!(check_origin(&Method::POST, &h, &[]), OriginCheck::Rejected(_)));
    }

    #[test]
    fn test_no_browser_headers_skip() {
        let h = headers(&[(header::HOST, "forge.example.com")]);
        assert_eq!(check_origin(&Method::POST, &h, &[]), OriginCheck::Skipped);
    }
}
