//! Index page
//!
//! GET / renders the shell page that boots the front-end bundle.

use askama::Template;
use axum::{extract::State, response::IntoResponse, Extension};

use crate::middleware::Principal;
use crate::server::state::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub asset_url: String,
    pub debug: bool,
    pub js_file: String,
    pub css_file: String,
}

impl IndexTemplate {
    pub fn from_state(state: &AppState) -> Self {
        let assets = &state.assets;
        Self {
            asset_url: assets.asset_url.clone(),
            debug: assets.debug,
            js_file: assets.js_file.clone(),
            css_file: assets.css_file.clone(),
        }
    }
}

pub async fn index(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> impl IntoResponse {
    tracing::debug!(user_id = %principal.user_id, "Serving index page");
    IndexTemplate::from_state(&state)
}
