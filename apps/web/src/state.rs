use std::sync::Arc;

use chrono::Duration;
use handlebars::TemplateError;

use crate::catalog::CatalogHandle;
use crate::config::Config;
use crate::html::PageRenderer;
use crate::models::UploadConstraints;
use crate::render::RendererRegistry;
use crate::service::PortfolioService;
use crate::viewer::PortfolioViewer;
use crate::workflow::{SessionStore, WorkflowController, WorkflowSettings};

/// Where the not-found page sends readers to start their own portfolio.
pub const HOME_PATH: &str = "/";

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Parser and deploy backend. `HttpPortfolioService` outside tests.
    pub service: Arc<dyn PortfolioService>,
    pub registry: Arc<RendererRegistry>,
    /// Fetched on first use, then shared read-only by every session.
    pub catalog: Arc<CatalogHandle>,
    pub sessions: Arc<SessionStore>,
    pub viewer: Arc<PortfolioViewer>,
    pub pages: Arc<PageRenderer>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<dyn PortfolioService>) -> Result<Self, TemplateError> {
        let registry = Arc::new(RendererRegistry::builtin());
        let catalog = Arc::new(CatalogHandle::new(service.clone(), registry.clone()));
        let viewer = Arc::new(PortfolioViewer::new(
            service.clone(),
            catalog.clone(),
            registry.clone(),
            HOME_PATH,
        ));

        let sessions = Arc::new(SessionStore::with_idle_timeout(Duration::minutes(
            config.session_idle_minutes.into(),
        )));

        Ok(Self {
            config,
            service,
            registry,
            catalog,
            sessions,
            viewer,
            pages: Arc::new(PageRenderer::new()?),
        })
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            constraints: UploadConstraints::with_max_bytes(self.config.max_upload_bytes),
            public_origin: self.config.public_origin.clone(),
        }
    }

    /// A controller for a new session, over the shared catalog.
    pub async fn new_controller(&self) -> WorkflowController {
        WorkflowController::new(
            self.service.clone(),
            self.catalog.get().await,
            self.workflow_settings(),
        )
    }
}
