use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::errors::AppError;
use crate::html::{PortfolioFrame, ViewQuery};
use crate::models::deployment::portfolio_path;
use crate::state::AppState;
use crate::viewer::ViewerOutcome;

/// GET /portfolio/:slug
/// Renders a deployed portfolio, or the not-found page with a link home.
pub async fn handle_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, AppError> {
    match state.viewer.view(&slug, &query.interactions()).await {
        ViewerOutcome::Rendered { page, .. } => {
            let base_path = portfolio_path(&slug);
            let html = state.pages.portfolio(
                &page,
                PortfolioFrame {
                    base_path: &base_path,
                    query: &query,
                    preview: None,
                },
            )?;
            Ok(Html(html).into_response())
        }
        ViewerOutcome::NotFound { home_path, .. } => {
            let html = state.pages.not_found(&home_path)?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
    }
}
