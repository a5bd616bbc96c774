//! Backend boundary, the single point of entry for the parser and deploy service.
//!
//! Every call resolves to either a value or a [`ServiceFailure`]. Transport
//! errors, non-2xx statuses and `{"success": false}` bodies all collapse into the
//! same failure shape, so callers never branch on where a call went wrong.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DeployReceipt, DeployRequest, DeploymentRecord, ResumeData, Template, UploadedFile};

pub mod http;
mod wire;

#[cfg(test)]
pub mod fake;

pub use http::HttpPortfolioService;

/// The four boundary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchTemplates,
    ParseResume,
    DeployPortfolio,
    FetchPortfolio,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::FetchTemplates => "fetch templates",
            Operation::ParseResume => "parse resume",
            Operation::DeployPortfolio => "deploy portfolio",
            Operation::FetchPortfolio => "fetch portfolio",
        })
    }
}

/// Normalized failure of a boundary call. `detail` is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {detail}")]
pub struct ServiceFailure {
    pub operation: Operation,
    pub detail: String,
}

impl ServiceFailure {
    pub fn new(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }
}

/// Parser and deploy backend, swappable behind `Arc<dyn PortfolioService>`.
#[async_trait]
pub trait PortfolioService: Send + Sync {
    async fn fetch_templates(&self) -> Result<Vec<Template>, ServiceFailure>;

    async fn parse_resume(&self, file: &UploadedFile) -> Result<ResumeData, ServiceFailure>;

    async fn deploy_portfolio(
        &self,
        request: DeployRequest<'_>,
    ) -> Result<DeployReceipt, ServiceFailure>;

    async fn fetch_portfolio(&self, slug: &str) -> Result<DeploymentRecord, ServiceFailure>;
}
