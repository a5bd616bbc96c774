pub mod health;
pub mod portfolio;
pub mod workflow;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Leave room above the upload limit so oversized files reach the
    // workflow's own check and get a readable message.
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health::health_handler))
        // Workflow
        .route("/", get(workflow::handle_index))
        .route("/upload", post(workflow::handle_upload))
        .route("/templates/:id/select", post(workflow::handle_select))
        .route("/preview", get(workflow::handle_preview))
        .route("/deploy", post(workflow::handle_deploy))
        .route("/reset", post(workflow::handle_reset))
        .route("/api/session", get(workflow::handle_session))
        // Published portfolios
        .route("/portfolio/:slug", get(portfolio::handle_view))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
