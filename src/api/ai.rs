//! AI relay endpoints
//!
//! - POST /api/ai/simple/ - one prompt in, one reply out
//! - POST /api/ai/chat/   - a whole conversation in, the next reply out
//!
//! Bodies are taken as raw bytes so malformed JSON can be handled the way
//! each endpoint needs (form fallback for the simple endpoint, empty
//! payload for the chat endpoint) instead of axum's default rejection.

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, State},
    http::{header, HeaderMap, Method, Request},
    Extension, Form, Json,
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::middleware::Principal;
use crate::schemas::{ChatMessage, PromptForm, ReplyResponse};
use crate::server::state::AppState;

pub const MISSING_PROMPT: &str = "Missing 'prompt'.";
pub const MISSING_MESSAGES: &str = "Missing 'messages' list.";
pub const INVALID_MESSAGE: &str = "Invalid 'messages' entry.";
pub const INVALID_MODEL: &str = "Invalid 'model'.";

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/ai/simple/
///
/// Accepts `{"prompt": "..."}` as JSON, or a `prompt` field of a urlencoded
/// or multipart form when the body is not a JSON object.
pub async fn simple_prompt(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReplyResponse>, ApiError> {
    let prompt = extract_prompt(&headers, body)
        .await
        .ok_or_else(|| ApiError::invalid_request(MISSING_PROMPT))?;

    tracing::info!(
        user_id = %principal.user_id,
        anonymous = principal.anonymous,
        prompt_chars = prompt.chars().count(),
        "Simple prompt request"
    );

    let reply = state.ai.simple_prompt(&prompt, None).await?;
    Ok(Json(ReplyResponse { reply }))
}

/// POST /api/ai/chat/
///
/// Accepts `{"messages": [{"role", "content"}, ...], "model"?: "..."}`.
pub async fn chat(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Bytes,
) -> Result<Json<ReplyResponse>, ApiError> {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let messages = parse_messages(payload.get("messages"))?;
    let model = resolve_model(payload.get("model"))?;

    tracing::info!(
        user_id = %principal.user_id,
        anonymous = principal.anonymous,
        messages = messages.len(),
        model = %model.as_deref().unwrap_or(state.ai.default_model()),
        "Chat completion request"
    );

    let reply = state.ai.chat_completion(messages, model.as_deref()).await?;
    Ok(Json(ReplyResponse { reply }))
}

// ============================================================================
// Body Parsing
// ============================================================================

/// Pull a non-empty prompt out of a JSON object, falling back to form fields
async fn extract_prompt(headers: &HeaderMap, body: Bytes) -> Option<String> {
    let prompt = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(mut payload)) => match payload.remove("prompt") {
            Some(Value::String(prompt)) => Some(prompt),
            _ => None,
        },
        _ => form_prompt(headers, body).await,
    };

    prompt.filter(|p| !p.is_empty())
}

/// Decode `prompt` from a urlencoded or multipart form body; other content
/// types yield nothing
async fn form_prompt(headers: &HeaderMap, body: Bytes) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?;
    let is_multipart = content_type
        .to_str()
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let request = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .ok()?;

    if is_multipart {
        return multipart_prompt(request).await;
    }

    match Form::<PromptForm>::from_request(request, &()).await {
        Ok(Form(form)) => form.prompt,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Body is neither a JSON object nor a prompt form");
            None
        }
    }
}

/// First `prompt` part of a multipart body
async fn multipart_prompt(request: Request<Body>) -> Option<String> {
    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable multipart body");
            return None;
        }
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("prompt") {
            return field.text().await.ok();
        }
    }
    None
}

/// `messages` must be a non-empty array of objects with string `role` and
/// `content`; any other fields are kept as sent
fn parse_messages(value: Option<&Value>) -> Result<Vec<ChatMessage>, ApiError> {
    let items = match value {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(ApiError::invalid_request(MISSING_MESSAGES)),
    };

    items
        .iter()
        .map(|item| {
            serde_json::from_value::<ChatMessage>(item.clone())
                .map_err(|_| ApiError::invalid_request(INVALID_MESSAGE))
        })
        .collect()
}

/// Absent or falsy `model` means the default; a non-empty string is used as is
fn resolve_model(value: Option<&Value>) -> Result<Option<String>, ApiError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(model)) if model.is_empty() => Ok(None),
        Some(Value::String(model)) => Ok(Some(model.clone())),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Ok(None),
        Some(Value::Array(items)) if items.is_empty() => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(_) => Err(ApiError::invalid_request(INVALID_MODEL)),
    }
}

// ============================================================================
// Tests
// ============================================================================
