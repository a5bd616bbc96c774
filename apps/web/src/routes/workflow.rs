//! Handlers for the upload → select → deploy flow.
//!
//! Each browser session is keyed by a cookie. A session is started by the first
//! action that changes workflow state; read-only pages for a visitor without
//! one show a fresh workflow and store nothing. Actions answer with a redirect
//! back to `/`, where the current step and any notice are shown.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::html::{PortfolioFrame, Preview, ViewQuery};
use crate::models::UploadedFile;
use crate::state::{AppState, HOME_PATH};
use crate::workflow::{WorkflowController, WorkflowSnapshot};

pub const SESSION_COOKIE: &str = "portfolio_session";

/// GET /
pub async fn handle_index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Html<String>, AppError> {
    let controller = current_or_fresh(&state, &jar).await;
    let snapshot = controller.snapshot().await;
    let html = state
        .pages
        .workflow(&snapshot, controller.catalog(), controller.constraints())?;
    Ok(Html(html))
}

/// POST /upload
/// Multipart form with a `file` field.
pub async fn handle_upload(
    State(state): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, Redirect), AppError> {
    let (jar, controller) = session(&state, jar).await;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Upload could not be read: {e}")))?;
        // Browsers send an empty, nameless part when nothing was chosen.
        if !file_name.is_empty() || !bytes.is_empty() {
            file = Some(UploadedFile::new(file_name, content_type, bytes));
        }
        break;
    }

    // Run to completion even if the client goes away, so the busy flag is
    // always released.
    let outcome = tokio::spawn(async move { controller.submit_upload(file).await })
        .await
        .map_err(|e| AppError::Internal(anyhow!("upload task failed: {e}")))?;
    if let Err(err) = outcome {
        debug!("Upload not accepted: {err}");
    }
    Ok((jar, Redirect::to(HOME_PATH)))
}

/// POST /templates/:id/select
pub async fn handle_select(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(template_id): Path<String>,
) -> (CookieJar, Redirect) {
    let (jar, controller) = session(&state, jar).await;
    if let Err(err) = controller.select_template(&template_id).await {
        debug!("Selection not accepted: {err}");
    }
    (jar, Redirect::to(HOME_PATH))
}

/// GET /preview
/// The chosen template over the session's resume, before deploying.
pub async fn handle_preview(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ViewQuery>,
) -> Result<Response, AppError> {
    let Some(controller) = existing_session(&state, &jar) else {
        return Ok(Redirect::to(HOME_PATH).into_response());
    };
    let page = match controller
        .preview(&state.registry, &query.interactions())
        .await
    {
        Ok(page) => page,
        Err(err) => {
            debug!("Nothing to preview: {err}");
            return Ok(Redirect::to(HOME_PATH).into_response());
        }
    };

    let snapshot = controller.snapshot().await;
    let template_name = snapshot
        .template
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or(page.template_id.as_str());
    let html = state.pages.portfolio(
        &page,
        PortfolioFrame {
            base_path: "/preview",
            query: &query,
            preview: Some(Preview {
                template_name,
                deploying: snapshot.deploying,
            }),
        },
    )?;
    Ok(Html(html).into_response())
}

/// POST /deploy
pub async fn handle_deploy(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let (jar, controller) = session(&state, jar).await;
    let outcome = tokio::spawn(async move { controller.submit_deploy().await })
        .await
        .map_err(|e| AppError::Internal(anyhow!("deploy task failed: {e}")))?;
    if let Err(err) = outcome {
        debug!("Deploy not accepted: {err}");
    }
    Ok((jar, Redirect::to(HOME_PATH)))
}

/// POST /reset
/// Without a session there is nothing to clear.
pub async fn handle_reset(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    if let Some(controller) = existing_session(&state, &jar) {
        controller.reset().await;
    }
    Redirect::to(HOME_PATH)
}

/// GET /api/session
/// JSON snapshot of the caller's workflow.
pub async fn handle_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Json<WorkflowSnapshot> {
    let controller = current_or_fresh(&state, &jar).await;
    Json(controller.snapshot().await)
}

fn existing_session(state: &AppState, jar: &CookieJar) -> Option<Arc<WorkflowController>> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .and_then(|id| state.sessions.get(&id))
}

/// The caller's controller, or an unregistered one in its initial state.
async fn current_or_fresh(state: &AppState, jar: &CookieJar) -> Arc<WorkflowController> {
    match existing_session(state, jar) {
        Some(controller) => controller,
        None => Arc::new(state.new_controller().await),
    }
}

/// The caller's controller, starting a session when the cookie is missing
/// or unknown.
async fn session(state: &AppState, jar: CookieJar) -> (CookieJar, Arc<WorkflowController>) {
    if let Some(controller) = existing_session(state, &jar) {
        return (jar, controller);
    }

    let (id, controller) = state.sessions.insert(state.new_controller().await);
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), controller)
}
