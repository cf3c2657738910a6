//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{middleware, routing::{get, post}, Router};
use tower_http::services::ServeDir;

use crate::api::{ai, health, index};
use crate::middleware::{auth::require_login, csrf::verify_origin, logging::log_request};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // Health check routes (no authentication required)
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness))
        .route("/liveness", get(health::liveness));

    // Layer order: last added = outermost = runs first,
    // so the session is checked before the origin
    let ai_routes = Router::new()
        .route("/api/ai/simple/", post(ai::simple_prompt))
        .route("/api/ai/chat/", post(ai::chat))
        .layer(middleware::from_fn_with_state(state.clone(), verify_origin))
        .layer(middleware::from_fn_with_state(state.clone(), require_login));

    let page_routes = Router::new()
        .route("/", get(index::index))
        .layer(middleware::from_fn_with_state(state.clone(), require_login));

    let mut router = Router::new()
        .merge(page_routes)
        .merge(ai_routes)
        .merge(health_routes);

    let static_dir = &state.settings.frontend.static_dir;
    if static_dir.is_dir() {
        tracing::debug!(dir = %static_dir.display(), "Serving static files under /static");
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router
        // Custom request logging with trace IDs
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
