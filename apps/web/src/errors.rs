use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::UploadRejection;
use crate::service::ServiceFailure;
use crate::workflow::Step;

/// Failures surfaced to the person driving the workflow or viewing a portfolio.
/// None of them abort the session; each maps to a message shown on the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("upload rejected: {0}")]
    UploadRejected(#[from] UploadRejection),

    #[error("resume parsing failed: {0}")]
    ParseFailed(ServiceFailure),

    #[error("deploy failed: {0}")]
    DeployFailed(ServiceFailure),

    #[error("template catalog unavailable: {0}")]
    CatalogUnavailable(ServiceFailure),

    #[error("portfolio `{slug}` not found")]
    PortfolioNotFound { slug: String },

    #[error("template `{0}` is not in the catalog")]
    UnknownTemplate(String),

    #[error("a deploy is already in flight")]
    DeployInFlight,

    #[error("cannot {action} while {step}")]
    InvalidTransition { action: &'static str, step: Step },
}

impl WorkflowError {
    /// Message shown in place of the failed action.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::UploadRejected(UploadRejection::NoFile) => {
                "Please choose a resume to upload.".to_string()
            }
            WorkflowError::UploadRejected(UploadRejection::UnsupportedType { .. }) => {
                "Only PDF and DOCX files are supported.".to_string()
            }
            WorkflowError::UploadRejected(reason) => format!("Upload rejected: {reason}."),
            WorkflowError::ParseFailed(_) => {
                "Error parsing resume. Please check your file and try again.".to_string()
            }
            WorkflowError::DeployFailed(_) => {
                "Failed to deploy portfolio. Please try again.".to_string()
            }
            WorkflowError::CatalogUnavailable(_) => {
                "Templates could not be loaded right now.".to_string()
            }
            WorkflowError::PortfolioNotFound { .. } => {
                "The portfolio you're looking for doesn't exist.".to_string()
            }
            WorkflowError::UnknownTemplate(_) => "That template is not available.".to_string(),
            WorkflowError::DeployInFlight => "Your portfolio is being deployed.".to_string(),
            WorkflowError::InvalidTransition { .. } => {
                "That action is not available at this step.".to_string()
            }
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The page could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
