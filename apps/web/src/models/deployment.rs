use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeData;

/// Payload handed to the deploy boundary.
#[derive(Debug, Clone, Copy)]
pub struct DeployRequest<'a> {
    pub identifier: &'a str,
    pub template_id: &'a str,
    pub resume_data: &'a ResumeData,
}

/// What the deploy boundary answers on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployReceipt {
    pub portfolio_url: String,
    pub slug: String,
}

/// A published portfolio. Fields are only readable; a record is never edited
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    slug: String,
    template_id: String,
    resume_data: ResumeData,
    portfolio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deployed_at: Option<DateTime<Utc>>,
}

impl DeploymentRecord {
    pub fn new(
        slug: impl Into<String>,
        template_id: impl Into<String>,
        resume_data: ResumeData,
        portfolio_url: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            template_id: template_id.into(),
            resume_data,
            portfolio_url: portfolio_url.into(),
            deployed_at: None,
        }
    }

    pub fn with_deployed_at(mut self, at: DateTime<Utc>) -> Self {
        self.deployed_at = Some(at);
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn resume_data(&self) -> &ResumeData {
        &self.resume_data
    }

    pub fn portfolio_url(&self) -> &str {
        &self.portfolio_url
    }

    pub fn deployed_at(&self) -> Option<DateTime<Utc>> {
        self.deployed_at
    }
}

/// Path under which a deployed portfolio is served.
pub fn portfolio_path(slug: &str) -> String {
    format!("/portfolio/{slug}")
}
