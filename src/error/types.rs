//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::schemas::ErrorResponse;
use crate::services::AiError;

/// Message returned for every upstream failure; the detail goes to the logs
pub const UPSTREAM_FAILURE_MESSAGE: &str = "AI service request failed.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Authentication required.")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("GROQ_API_KEY not set")]
    MissingCredential,

    #[error("Upstream error: {0}")]
    Upstream(AiError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        if err.is_upstream() {
            ApiError::Upstream(err)
        } else {
            ApiError::MissingCredential
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "AI provider request failed");
                UPSTREAM_FAILURE_MESSAGE.to_string()
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Internal server error.".to_string()
            }
            ApiError::MissingCredential => {
                tracing::error!("AI request rejected: GROQ_API_KEY not set");
                ApiError::MissingCredential.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
