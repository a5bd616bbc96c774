//! Portfolio viewer: the read-only path from a slug to a rendered page.
//!
//! A fetch failure, an unknown slug or a template id without a renderer all end
//! in [`ViewerOutcome::NotFound`]. The viewer never hands back a partial page
//! and never touches workflow state.

use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::CatalogHandle;
use crate::errors::WorkflowError;
use crate::models::{DeploymentRecord, Template};
use crate::render::{Interaction, RenderedPage, RendererRegistry};
use crate::service::PortfolioService;

const MAX_SLUG_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerOutcome {
    Rendered {
        record: DeploymentRecord,
        template: Template,
        page: RenderedPage,
    },
    NotFound {
        slug: String,
        /// Where the "create your portfolio" link points.
        home_path: String,
    },
}

pub struct PortfolioViewer {
    service: Arc<dyn PortfolioService>,
    catalog: Arc<CatalogHandle>,
    registry: Arc<RendererRegistry>,
    home_path: String,
}

impl PortfolioViewer {
    pub fn new(
        service: Arc<dyn PortfolioService>,
        catalog: Arc<CatalogHandle>,
        registry: Arc<RendererRegistry>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            service,
            catalog,
            registry,
            home_path: home_path.into(),
        }
    }

    /// Fetches the record published under `slug`. Malformed slugs are refused
    /// without a backend call.
    pub async fn load_portfolio(&self, slug: &str) -> Result<DeploymentRecord, WorkflowError> {
        let not_found = || WorkflowError::PortfolioNotFound {
            slug: slug.to_string(),
        };
        if !is_plausible_slug(slug) {
            return Err(not_found());
        }
        self.service.fetch_portfolio(slug).await.map_err(|failure| {
            warn!("{failure}");
            not_found()
        })
    }

    /// Loads `slug` and renders it through its template with `interactions`
    /// replayed on a fresh renderer.
    pub async fn view(&self, slug: &str, interactions: &[Interaction]) -> ViewerOutcome {
        match self.try_view(slug, interactions).await {
            Ok(outcome) => outcome,
            Err(err) => {
                info!("{err}");
                ViewerOutcome::NotFound {
                    slug: slug.to_string(),
                    home_path: self.home_path.clone(),
                }
            }
        }
    }

    async fn try_view(
        &self,
        slug: &str,
        interactions: &[Interaction],
    ) -> Result<ViewerOutcome, WorkflowError> {
        let record = self.load_portfolio(slug).await?;
        let catalog = self.catalog.get().await;

        let Some(template) = catalog.lookup(record.template_id()).cloned() else {
            warn!(
                slug,
                template_id = record.template_id(),
                "Portfolio references a template outside the catalog"
            );
            return Err(WorkflowError::PortfolioNotFound {
                slug: slug.to_string(),
            });
        };
        let Some(page) = self.registry.render_with(
            &template.id,
            Arc::new(record.resume_data().clone()),
            interactions,
        ) else {
            return Err(WorkflowError::UnknownTemplate(template.id));
        };

        Ok(ViewerOutcome::Rendered {
            record,
            template,
            page,
        })
    }
}

fn is_plausible_slug(slug: &str) -> bool {
    !slug.trim().is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.chars().any(|c| c == '/' || c.is_control())
}
