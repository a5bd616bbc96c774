//! Template catalog: the backend's descriptors narrowed to ids a renderer exists for.
//!
//! A successful fetch is kept for the life of the process and shared by every
//! session and by the portfolio viewer. A failed fetch hands the caller an
//! empty, unavailable catalog and is retried on the next call.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::errors::WorkflowError;
use crate::models::Template;
use crate::render::RendererRegistry;
use crate::service::PortfolioService;

/// Selectable templates, in backend order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    unavailable: bool,
}

impl TemplateCatalog {
    /// Keeps descriptors whose id has a renderer. The first descriptor wins
    /// when the backend repeats an id.
    pub fn from_descriptors(descriptors: Vec<Template>, registry: &RendererRegistry) -> Self {
        let mut templates: Vec<Template> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if !registry.contains(&descriptor.id) {
                warn!(template_id = %descriptor.id, "No renderer for template, dropping it");
                continue;
            }
            if templates.iter().any(|t| t.id == descriptor.id) {
                warn!(template_id = %descriptor.id, "Duplicate template descriptor ignored");
                continue;
            }
            templates.push(descriptor);
        }
        Self {
            templates,
            unavailable: false,
        }
    }

    /// Empty catalog standing in for one that could not be fetched.
    pub fn unavailable() -> Self {
        Self {
            templates: Vec::new(),
            unavailable: true,
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when the fetch failed rather than returning nothing usable.
    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }
}

/// Lazily fetched, process-wide catalog.
pub struct CatalogHandle {
    service: Arc<dyn PortfolioService>,
    registry: Arc<RendererRegistry>,
    cell: OnceCell<Arc<TemplateCatalog>>,
}

impl CatalogHandle {
    pub fn new(service: Arc<dyn PortfolioService>, registry: Arc<RendererRegistry>) -> Self {
        Self {
            service,
            registry,
            cell: OnceCell::new(),
        }
    }

    /// The catalog, fetching it until one fetch succeeds. Concurrent callers
    /// wait on a single in-flight backend call.
    pub async fn get(&self) -> Arc<TemplateCatalog> {
        match self.cell.get_or_try_init(|| self.fetch()).await {
            Ok(catalog) => catalog.clone(),
            Err(err) => {
                warn!("{err}");
                Arc::new(TemplateCatalog::unavailable())
            }
        }
    }

    async fn fetch(&self) -> Result<Arc<TemplateCatalog>, WorkflowError> {
        let descriptors = self
            .service
            .fetch_templates()
            .await
            .map_err(WorkflowError::CatalogUnavailable)?;
        let catalog = TemplateCatalog::from_descriptors(descriptors, &self.registry);
        info!("Template catalog loaded ({} templates)", catalog.len());
        Ok(Arc::new(catalog))
    }
}
