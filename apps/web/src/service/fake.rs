//! Scripted in-memory backend for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{Operation, PortfolioService, ServiceFailure};
use crate::models::deployment::portfolio_path;
use crate::models::{DeployReceipt, DeployRequest, DeploymentRecord, ResumeData, Template, UploadedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCall {
    pub identifier: String,
    pub template_id: String,
    pub resume_data: ResumeData,
}

/// Backend double that records calls and can hold deploys open.
#[derive(Default)]
pub struct FakeService {
    pub templates: Option<Vec<Template>>,
    pub parsed: Option<ResumeData>,
    pub fail_deploy: bool,
    /// Template fetches to fail before answering with `templates`.
    pub template_failures: AtomicUsize,
    pub parse_calls: AtomicUsize,
    pub template_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub deploy_calls: Mutex<Vec<DeployCall>>,
    records: Mutex<HashMap<String, DeploymentRecord>>,
    gate: Option<DeployGate>,
}

struct DeployGate {
    entered: Notify,
    release: Notify,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(mut self, ids: &[&str]) -> Self {
        self.templates = Some(ids.iter().map(|id| template(id)).collect());
        self
    }

    pub fn parsing_to(mut self, resume: ResumeData) -> Self {
        self.parsed = Some(resume);
        self
    }

    pub fn failing_template_fetches(self, count: usize) -> Self {
        self.template_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_deploys(mut self) -> Self {
        self.fail_deploy = true;
        self
    }

    /// Deploy calls wait for [`FakeService::release_deploy`] before answering.
    pub fn holding_deploys(mut self) -> Self {
        self.gate = Some(DeployGate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn deploy_entered(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notified().await;
        }
    }

    pub fn release_deploy(&self) {
        if let Some(gate) = &self.gate {
            gate.release.notify_one();
        }
    }

    pub fn parse_count(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn deploys(&self) -> Vec<DeployCall> {
        self.deploy_calls.lock().unwrap().clone()
    }

    pub fn insert_record(&self, record: DeploymentRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.slug().to_string(), record);
    }
}

pub fn template(id: &str) -> Template {
    Template {
        id: id.to_string(),
        name: format!("{id} template"),
        description: format!("The {id} layout"),
        preview_image: format!("https://img.example/{id}.png"),
    }
}

#[async_trait]
impl PortfolioService for FakeService {
    async fn fetch_templates(&self) -> Result<Vec<Template>, ServiceFailure> {
        self.template_calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .template_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ServiceFailure::new(Operation::FetchTemplates, "unavailable"));
        }
        self.templates
            .clone()
            .ok_or_else(|| ServiceFailure::new(Operation::FetchTemplates, "offline"))
    }

    async fn parse_resume(&self, _file: &UploadedFile) -> Result<ResumeData, ServiceFailure> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        self.parsed
            .clone()
            .ok_or_else(|| ServiceFailure::new(Operation::ParseResume, "unparseable"))
    }

    async fn deploy_portfolio(
        &self,
        request: DeployRequest<'_>,
    ) -> Result<DeployReceipt, ServiceFailure> {
        let ordinal = {
            let mut calls = self.deploy_calls.lock().unwrap();
            calls.push(DeployCall {
                identifier: request.identifier.to_string(),
                template_id: request.template_id.to_string(),
                resume_data: request.resume_data.clone(),
            });
            calls.len()
        };

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_deploy {
            return Err(ServiceFailure::new(Operation::DeployPortfolio, "refused"));
        }

        let slug = format!(
            "{}_{ordinal}",
            request.identifier.to_lowercase().replace(' ', "_")
        );
        let url = portfolio_path(&slug);
        self.insert_record(DeploymentRecord::new(
            slug.clone(),
            request.template_id,
            request.resume_data.clone(),
            url.clone(),
        ));
        Ok(DeployReceipt {
            portfolio_url: url,
            slug,
        })
    }

    async fn fetch_portfolio(&self, slug: &str) -> Result<DeploymentRecord, ServiceFailure> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| ServiceFailure::new(Operation::FetchPortfolio, "404"))
    }
}
