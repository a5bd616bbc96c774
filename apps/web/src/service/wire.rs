//! JSON shapes spoken by the backend under `/api`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::deployment::portfolio_path;
use crate::models::{DeployReceipt, DeploymentRecord, ResumeData, Template};

#[derive(Debug, Deserialize)]
pub struct TemplatesEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub templates: Vec<Template>,
}

#[derive(Debug, Deserialize)]
pub struct ParseEnvelope {
    #[serde(default)]
    pub success: bool,
    pub parsed_data: Option<ResumeData>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeployBody<'a> {
    pub username: &'a str,
    pub selected_template: &'a str,
    pub parsed_resume: &'a ResumeData,
}

#[derive(Debug, Deserialize)]
pub struct DeployEnvelope {
    #[serde(default)]
    pub success: bool,
    pub portfolio_url: Option<String>,
    pub slug: Option<String>,
    pub message: Option<String>,
}

impl DeployEnvelope {
    /// The backend may omit `slug`; it is then the last segment of `portfolio_url`.
    pub fn into_receipt(self) -> Option<DeployReceipt> {
        let portfolio_url = self.portfolio_url.filter(|u| !u.trim().is_empty())?;
        let slug = self
            .slug
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                portfolio_url
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(String::from)
            })?;
        Some(DeployReceipt {
            portfolio_url,
            slug,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PortfolioEnvelope {
    #[serde(default)]
    pub success: bool,
    pub portfolio: Option<PortfolioDocument>,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioDocument {
    pub parsed_resume: ResumeData,
    pub selected_template: String,
    pub route_slug: String,
    pub created_at: Option<String>,
}

impl PortfolioDocument {
    pub fn into_record(self) -> DeploymentRecord {
        let deployed_at = self.created_at.as_deref().and_then(parse_timestamp);
        let url = portfolio_path(&self.route_slug);
        let record = DeploymentRecord::new(
            self.route_slug,
            self.selected_template,
            self.parsed_resume,
            url,
        );
        match deployed_at {
            Some(at) => record.with_deployed_at(at),
            None => record,
        }
    }
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Accepts RFC 3339 and the zone-less ISO form the backend writes for UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
