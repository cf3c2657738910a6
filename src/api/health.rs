//! Health check endpoints
//!
//! This module provides health check endpoints for monitoring
//! and container orchestration (Kubernetes, ECS, etc.)

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::server::state::AppState;

/// Response for the main health check endpoint
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
}

/// Response for readiness probe
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub config_loaded: bool,
    pub ai_credential: bool,
    pub debug_assets: bool,
}

/// Response for liveness probe
#[derive(Serialize)]
pub struct LivenessResponse {
    pub alive: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.settings.app_version.clone(),
        environment: state.settings.environment.to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// GET /ready
///
/// Not ready while no Groq credential is available, since every AI call
/// would fail with a 500.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = ReadinessChecks {
        config_loaded: true,
        ai_credential: state.ai.has_credential(),
        debug_assets: state.assets.debug,
    };

    let ready = checks.config_loaded && checks.ai_credential;

    let status = if ready {
        StatusCode::OK
    } else {
        tracing::warn!(checks = ?checks, "Service not ready");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready, checks }))
}

/// GET /liveness
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { alive: true })
}
