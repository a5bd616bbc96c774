//! `reqwest` implementation of [`PortfolioService`] against the backend's `/api`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::wire::{
    DeployBody, DeployEnvelope, ErrorBody, ParseEnvelope, PortfolioEnvelope, TemplatesEnvelope,
};
use super::{Operation, PortfolioService, ServiceFailure};
use crate::models::{
    DeployReceipt, DeployRequest, DeploymentRecord, DocumentFormat, ResumeData, Template,
    UploadedFile,
};

/// Transport-level detail, collapsed into [`ServiceFailure`] before leaving this module.
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend reported failure: {0}")]
    Unsuccessful(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("backend URL `{0}` cannot carry a path")]
    BaseUrl(String),
}

impl HttpClientError {
    fn into_failure(self, operation: Operation) -> ServiceFailure {
        warn!("{operation} call failed: {self}");
        ServiceFailure::new(operation, self.to_string())
    }
}

/// Backend client. Requests carry no timeout; a slow backend keeps the caller
/// waiting until it answers.
#[derive(Clone)]
pub struct HttpPortfolioService {
    client: Client,
    api_base: Url,
}

impl HttpPortfolioService {
    /// `backend_url` is the backend's origin; endpoints live under `{backend_url}/api`.
    pub fn new(backend_url: &Url) -> Result<Self, HttpClientError> {
        let mut api_base = backend_url.clone();
        api_base
            .path_segments_mut()
            .map_err(|_| HttpClientError::BaseUrl(backend_url.to_string()))?
            .pop_if_empty()
            .push("api");

        Ok(Self {
            client: Client::builder().build()?,
            api_base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpClientError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| HttpClientError::BaseUrl(self.api_base.to_string()))?
            .extend(segments);
        Ok(url)
    }

    async fn get_templates(&self) -> Result<Vec<Template>, HttpClientError> {
        let url = self.endpoint(&["templates"])?;
        let response = self.client.get(url).send().await?;
        let envelope: TemplatesEnvelope = read_json(response).await?;
        if !envelope.success {
            return Err(HttpClientError::Unsuccessful("template listing".into()));
        }
        Ok(envelope.templates)
    }

    async fn post_resume(&self, file: &UploadedFile) -> Result<ResumeData, HttpClientError> {
        let mime = file
            .content_type
            .clone()
            .or_else(|| {
                DocumentFormat::detect(&file.file_name, None).map(|f| f.mime_type().to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&mime)?;
        let form = Form::new().part("file", part);

        let url = self.endpoint(&["resume", "parse"])?;
        let response = self.client.post(url).multipart(form).send().await?;
        let envelope: ParseEnvelope = read_json(response).await?;

        match envelope.parsed_data {
            Some(resume) if envelope.success => Ok(resume),
            _ => Err(HttpClientError::Unsuccessful(
                envelope.message.unwrap_or_else(|| "resume was not parsed".into()),
            )),
        }
    }

    async fn post_deploy(
        &self,
        request: DeployRequest<'_>,
    ) -> Result<DeployReceipt, HttpClientError> {
        let body = DeployBody {
            username: request.identifier,
            selected_template: request.template_id,
            parsed_resume: request.resume_data,
        };

        let url = self.endpoint(&["portfolio", "deploy"])?;
        let response = self.client.post(url).json(&body).send().await?;
        let envelope: DeployEnvelope = read_json(response).await?;

        if !envelope.success {
            return Err(HttpClientError::Unsuccessful(
                envelope.message.unwrap_or_else(|| "deploy was refused".into()),
            ));
        }
        envelope
            .into_receipt()
            .ok_or_else(|| HttpClientError::Unsuccessful("deploy answer carried no URL".into()))
    }

    async fn get_portfolio(&self, slug: &str) -> Result<DeploymentRecord, HttpClientError> {
        let url = self.endpoint(&["portfolio", slug])?;
        let response = self.client.get(url).send().await?;
        let envelope: PortfolioEnvelope = read_json(response).await?;

        match envelope.portfolio {
            Some(document) if envelope.success => Ok(document.into_record()),
            _ => Err(HttpClientError::Unsuccessful(format!(
                "portfolio `{slug}` not returned"
            ))),
        }
    }
}

/// Reads a JSON body, turning non-2xx statuses into [`HttpClientError::Status`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, HttpClientError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        // Try to parse error message
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        return Err(HttpClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    debug!("backend answered {status} with {} bytes", body.len());
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl PortfolioService for HttpPortfolioService {
    async fn fetch_templates(&self) -> Result<Vec<Template>, ServiceFailure> {
        self.get_templates()
            .await
            .map_err(|e| e.into_failure(Operation::FetchTemplates))
    }

    async fn parse_resume(&self, file: &UploadedFile) -> Result<ResumeData, ServiceFailure> {
        self.post_resume(file)
            .await
            .map_err(|e| e.into_failure(Operation::ParseResume))
    }

    async fn deploy_portfolio(
        &self,
        request: DeployRequest<'_>,
    ) -> Result<DeployReceipt, ServiceFailure> {
        self.post_deploy(request)
            .await
            .map_err(|e| e.into_failure(Operation::DeployPortfolio))
    }

    async fn fetch_portfolio(&self, slug: &str) -> Result<DeploymentRecord, ServiceFailure> {
        self.get_portfolio(slug)
            .await
            .map_err(|e| e.into_failure(Operation::FetchPortfolio))
    }
}
