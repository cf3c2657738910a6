//! Request logging middleware
//!
//! Every request gets a trace id (taken from the caller when present),
//! a span, a start line and a completion line whose level follows the
//! status class. The id is echoed back in the response headers.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Header name for trace ID
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Header name for request ID (alias for trace ID)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id shared by a request's log lines and response headers
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new trace ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reuse the caller's id from `x-trace-id` or `x-request-id`, else generate one
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        [TRACE_ID_HEADER, REQUEST_ID_HEADER]
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
            })
            .map(|id| Self(id.to_string()))
            .unwrap_or_default()
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Middleware to log HTTP requests and responses
pub async fn log_request(request: Request, next: Next) -> Response<Body> {
    let start = Instant::now();
    let trace_id = TraceId::from_headers(request.headers());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        user_agent = %user_agent,
        "Incoming request"
    );

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );
    let mut response = next.run(request).instrument(span).await;

    let duration_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);
    log_completion(response.status(), &trace_id, method.as_str(), &path, &duration_ms);

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value.clone());
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn log_completion(status: StatusCode, trace_id: &TraceId, method: &str, path: &str, duration_ms: &str) {
    let code = status.as_u16();
    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, method, path, status = code, duration_ms, "Server error");
    } else if status.is_client_error() {
        tracing::warn!(trace_id = %trace_id, method, path, status = code, duration_ms, "Client error");
    } else {
        tracing::info!(trace_id = %trace_id, method, path, status = code, duration_ms, "Request completed");
    }
}
