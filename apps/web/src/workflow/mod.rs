//! Workflow controller. Drives one session through upload, parse, template
//! selection and deploy.
//!
//! ```text
//!                                              select (re-pick)
//!                                                 ┌────┐
//!                                                 ▼    │
//! AwaitingUpload ──upload──▶ Parsed ──select──▶ TemplateChosen ──deploy──▶ Deployed
//!        ▲                                                                    │
//!        └───────────────────────── reset (from any state) ───────────────────┘
//! ```
//!
//! Upload and deploy each hold a busy flag while their backend call is in
//! flight; a second trigger is ignored. The lock is never held across an await.
//! Every dispatch takes a ticket, and a reset invalidates outstanding tickets so
//! a late result cannot resurrect cleared state.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::TemplateCatalog;
use crate::models::{DeployRequest, DeploymentRecord, ResumeData, Template, UploadConstraints, UploadedFile};
use crate::render::{Interaction, RenderedPage, RendererRegistry};
use crate::service::PortfolioService;

pub mod session;

pub use crate::errors::WorkflowError;
pub use session::SessionStore;

// ────────────────────────────────────────────────────────────────────────────
// State
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitingUpload,
    Parsed,
    TemplateChosen,
    Deployed,
}

impl Step {
    /// 1-based position shown in the step indicator.
    pub fn number(self) -> u8 {
        match self {
            Step::AwaitingUpload => 1,
            Step::Parsed => 2,
            Step::TemplateChosen => 3,
            Step::Deployed => 4,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::AwaitingUpload => "awaiting upload",
            Step::Parsed => "parsed",
            Step::TemplateChosen => "template chosen",
            Step::Deployed => "deployed",
        })
    }
}

/// Session data carried by each step. Later steps keep everything earlier
/// steps stored.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    AwaitingUpload,
    Parsed {
        resume: Arc<ResumeData>,
    },
    TemplateChosen {
        resume: Arc<ResumeData>,
        template: Template,
    },
    Deployed {
        resume: Arc<ResumeData>,
        template: Template,
        deployment: DeploymentRecord,
    },
}

impl WorkflowState {
    pub fn step(&self) -> Step {
        match self {
            WorkflowState::AwaitingUpload => Step::AwaitingUpload,
            WorkflowState::Parsed { .. } => Step::Parsed,
            WorkflowState::TemplateChosen { .. } => Step::TemplateChosen,
            WorkflowState::Deployed { .. } => Step::Deployed,
        }
    }

    pub fn resume(&self) -> Option<&Arc<ResumeData>> {
        match self {
            WorkflowState::AwaitingUpload => None,
            WorkflowState::Parsed { resume }
            | WorkflowState::TemplateChosen { resume, .. }
            | WorkflowState::Deployed { resume, .. } => Some(resume),
        }
    }

    pub fn template(&self) -> Option<&Template> {
        match self {
            WorkflowState::TemplateChosen { template, .. }
            | WorkflowState::Deployed { template, .. } => Some(template),
            _ => None,
        }
    }

    pub fn deployment(&self) -> Option<&DeploymentRecord> {
        match self {
            WorkflowState::Deployed { deployment, .. } => Some(deployment),
            _ => None,
        }
    }
}

/// Outcome of a network-bound step that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch<T> {
    /// The call resolved and the state advanced.
    Completed(T),
    /// The same step was already in flight; nothing was sent.
    Ignored,
    /// A reset happened while the call was in flight; its result was dropped.
    Superseded,
}

/// Serializable view of a session, used by the pages and `/api/session`.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub step: Step,
    pub step_number: u8,
    pub resume: Option<Arc<ResumeData>>,
    pub template: Option<Template>,
    pub deployment: Option<DeploymentRecord>,
    /// Absolute address of the deployed portfolio when an origin is configured.
    pub share_url: Option<String>,
    pub file_name: Option<String>,
    pub uploading: bool,
    pub deploying: bool,
    pub notice: Option<String>,
}

/// Per-session settings injected at construction.
#[derive(Debug, Clone, Default)]
pub struct WorkflowSettings {
    pub constraints: UploadConstraints,
    pub public_origin: Option<Url>,
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct StepGate {
    busy: bool,
    ticket: u64,
}

impl StepGate {
    fn acquire(&mut self) -> u64 {
        self.busy = true;
        self.ticket += 1;
        self.ticket
    }

    /// Clears the busy flag and reports whether `ticket` is still current.
    fn release(&mut self, ticket: u64) -> bool {
        self.busy = false;
        self.ticket == ticket
    }
}

#[derive(Debug)]
struct Inner {
    state: WorkflowState,
    upload: StepGate,
    deploy: StepGate,
    file_name: Option<String>,
    notice: Option<String>,
}

pub struct WorkflowController {
    service: Arc<dyn PortfolioService>,
    catalog: Arc<TemplateCatalog>,
    settings: WorkflowSettings,
    inner: Mutex<Inner>,
}

impl WorkflowController {
    pub fn new(
        service: Arc<dyn PortfolioService>,
        catalog: Arc<TemplateCatalog>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            service,
            catalog,
            settings,
            inner: Mutex::new(Inner {
                state: WorkflowState::AwaitingUpload,
                upload: StepGate::default(),
                deploy: StepGate::default(),
                file_name: None,
                notice: None,
            }),
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn constraints(&self) -> &UploadConstraints {
        &self.settings.constraints
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.lock().await.state.clone()
    }

    /// Validates `file` locally, then sends it to the parser.
    ///
    /// A file outside the allow-list or size limit is rejected before any
    /// backend call. On success the session moves to [`Step::Parsed`].
    pub async fn submit_upload(
        &self,
        file: Option<UploadedFile>,
    ) -> Result<Dispatch<Arc<ResumeData>>, WorkflowError> {
        let (ticket, file) = {
            let mut inner = self.inner.lock().await;
            if inner.upload.busy {
                debug!("Upload already in flight, ignoring");
                return Ok(Dispatch::Ignored);
            }
            let step = inner.state.step();
            if step != Step::AwaitingUpload {
                return Err(inner.fail(WorkflowError::InvalidTransition {
                    action: "upload a resume",
                    step,
                }));
            }
            if let Err(rejection) = self.settings.constraints.check(file.as_ref()) {
                return Err(inner.fail(rejection.into()));
            }
            let Some(file) = file else {
                return Err(inner.fail(WorkflowError::InvalidTransition {
                    action: "upload without a file",
                    step,
                }));
            };
            inner.file_name = Some(file.file_name.clone());
            inner.notice = None;
            (inner.upload.acquire(), file)
        };

        info!(file = %file.file_name, size = file.bytes.len(), "Parsing resume");
        let result = self.service.parse_resume(&file).await;

        let mut inner = self.inner.lock().await;
        if !inner.upload.release(ticket) {
            info!("Parse result arrived after reset, discarding");
            return Ok(Dispatch::Superseded);
        }
        match result {
            Ok(resume) => {
                let resume = Arc::new(resume);
                inner.state = WorkflowState::Parsed {
                    resume: resume.clone(),
                };
                info!("Resume parsed");
                Ok(Dispatch::Completed(resume))
            }
            Err(failure) => Err(inner.fail(WorkflowError::ParseFailed(failure))),
        }
    }

    /// Picks a catalog template. Re-selecting before deploy replaces the
    /// earlier choice.
    pub async fn select_template(&self, template_id: &str) -> Result<Template, WorkflowError> {
        let mut inner = self.inner.lock().await;
        if inner.deploy.busy {
            return Err(inner.fail(WorkflowError::DeployInFlight));
        }
        let resume = match &inner.state {
            WorkflowState::Parsed { resume } | WorkflowState::TemplateChosen { resume, .. } => {
                resume.clone()
            }
            other => {
                let step = other.step();
                return Err(inner.fail(WorkflowError::InvalidTransition {
                    action: "select a template",
                    step,
                }));
            }
        };
        let Some(template) = self.catalog.lookup(template_id).cloned() else {
            return Err(inner.fail(WorkflowError::UnknownTemplate(template_id.to_string())));
        };

        info!(template_id = %template.id, "Template selected");
        inner.state = WorkflowState::TemplateChosen {
            resume,
            template: template.clone(),
        };
        inner.notice = None;
        Ok(template)
    }

    /// Publishes the stored resume under the selected template.
    pub async fn submit_deploy(&self) -> Result<Dispatch<DeploymentRecord>, WorkflowError> {
        let (ticket, resume, template) = {
            let mut inner = self.inner.lock().await;
            if inner.deploy.busy {
                debug!("Deploy already in flight, ignoring");
                return Ok(Dispatch::Ignored);
            }
            let (resume, template) = match &inner.state {
                WorkflowState::TemplateChosen { resume, template } => {
                    (resume.clone(), template.clone())
                }
                other => {
                    let step = other.step();
                    return Err(inner.fail(WorkflowError::InvalidTransition {
                        action: "deploy",
                        step,
                    }));
                }
            };
            inner.notice = None;
            (inner.deploy.acquire(), resume, template)
        };

        let request = DeployRequest {
            identifier: resume.deploy_identifier(),
            template_id: &template.id,
            resume_data: &resume,
        };
        info!(identifier = request.identifier, template_id = %template.id, "Deploying portfolio");
        let result = self.service.deploy_portfolio(request).await;

        let mut inner = self.inner.lock().await;
        if !inner.deploy.release(ticket) {
            info!("Deploy result arrived after reset, discarding");
            return Ok(Dispatch::Superseded);
        }
        match result {
            Ok(receipt) => {
                let deployment = DeploymentRecord::new(
                    receipt.slug,
                    template.id.clone(),
                    resume.as_ref().clone(),
                    receipt.portfolio_url,
                )
                .with_deployed_at(Utc::now());
                info!(slug = deployment.slug(), "Portfolio deployed");
                inner.state = WorkflowState::Deployed {
                    resume,
                    template,
                    deployment: deployment.clone(),
                };
                Ok(Dispatch::Completed(deployment))
            }
            Err(failure) => Err(inner.fail(WorkflowError::DeployFailed(failure))),
        }
    }

    /// Clears all stored data. In-flight calls keep their busy flag until
    /// they resolve, but their results are dropped.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = WorkflowState::AwaitingUpload;
        inner.upload.ticket += 1;
        inner.deploy.ticket += 1;
        inner.file_name = None;
        inner.notice = None;
        info!("Workflow reset");
    }

    /// Renders the chosen template over the session's resume. Renderer state
    /// lives only for this call.
    pub async fn preview(
        &self,
        registry: &RendererRegistry,
        interactions: &[Interaction],
    ) -> Result<RenderedPage, WorkflowError> {
        let (resume, template_id) = {
            let inner = self.inner.lock().await;
            match &inner.state {
                WorkflowState::TemplateChosen { resume, template }
                | WorkflowState::Deployed {
                    resume, template, ..
                } => (resume.clone(), template.id.clone()),
                other => {
                    return Err(WorkflowError::InvalidTransition {
                        action: "preview",
                        step: other.step(),
                    })
                }
            }
        };
        registry
            .render_with(&template_id, resume, interactions)
            .ok_or(WorkflowError::UnknownTemplate(template_id))
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.inner.lock().await;
        let deployment = inner.state.deployment().cloned();
        let share_url = deployment
            .as_ref()
            .map(|d| self.share_url(d.portfolio_url()));
        WorkflowSnapshot {
            step: inner.state.step(),
            step_number: inner.state.step().number(),
            resume: inner.state.resume().cloned(),
            template: inner.state.template().cloned(),
            deployment,
            share_url,
            file_name: inner.file_name.clone(),
            uploading: inner.upload.busy,
            deploying: inner.deploy.busy,
            notice: inner.notice.clone(),
        }
    }

    fn share_url(&self, portfolio_url: &str) -> String {
        match &self.settings.public_origin {
            Some(origin) => match origin.join(portfolio_url) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    warn!("Cannot join portfolio url `{portfolio_url}` onto origin: {e}");
                    portfolio_url.to_string()
                }
            },
            None => portfolio_url.to_string(),
        }
    }
}

impl Inner {
    /// Records the user-facing message and hands the error back.
    fn fail(&mut self, err: WorkflowError) -> WorkflowError {
        match &err {
            WorkflowError::ParseFailed(f) | WorkflowError::DeployFailed(f) => {
                warn!("{f}");
            }
            other => debug!("Workflow action refused: {other}"),
        }
        self.notice = Some(err.user_message());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{full_resume, jane_doe};
    use crate::models::UploadRejection;
    use crate::service::fake::{template, FakeService};
    use bytes::Bytes;

    fn pdf() -> UploadedFile {
        UploadedFile::new("cv.pdf", Some("application/pdf".into()), Bytes::from_static(b"%PDF-1.4"))
    }

    fn catalog(ids: &[&str]) -> Arc<TemplateCatalog> {
        Arc::new(TemplateCatalog::from_descriptors(
            ids.iter().map(|id| template(id)).collect(),
            &RendererRegistry::builtin(),
        ))
    }

    fn controller(service: Arc<FakeService>) -> Arc<WorkflowController> {
        Arc::new(WorkflowController::new(
            service,
            catalog(&["pro-classic", "neon-grid", "solar-verse"]),
            WorkflowSettings::default(),
        ))
    }

    async fn chosen(service: Arc<FakeService>, id: &str) -> Arc<WorkflowController> {
        let controller = controller(service);
        controller.submit_upload(Some(pdf())).await.unwrap();
        controller.select_template(id).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn test_disallowed_type_never_calls_parser() {
        let service = FakeService::new().parsing_to(jane_doe()).into_arc();
        let controller = controller(service.clone());

        let txt = UploadedFile::new("cv.txt", Some("text/plain".into()), Bytes::from_static(b"hi"));
        let err = controller.submit_upload(Some(txt)).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::UploadRejected(UploadRejection::UnsupportedType { .. })
        ));

        let err = controller.submit_upload(None).await.unwrap_err();
        assert_eq!(err, WorkflowError::UploadRejected(UploadRejection::NoFile));

        assert_eq!(service.parse_count(), 0);
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.step, Step::AwaitingUpload);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Please choose a resume to upload.")
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected_locally() {
        let service = FakeService::new().parsing_to(jane_doe()).into_arc();
        let controller = WorkflowController::new(
            service.clone(),
            catalog(&["pro-classic"]),
            WorkflowSettings {
                constraints: UploadConstraints::with_max_bytes(4),
                public_origin: None,
            },
        );
        let err = controller.submit_upload(Some(pdf())).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::UploadRejected(UploadRejection::TooLarge { limit: 4, .. })
        ));
        assert_eq!(service.parse_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_moves_to_parsed() {
        let service = FakeService::new().parsing_to(jane_doe()).into_arc();
        let controller = controller(service.clone());

        let dispatch = controller.submit_upload(Some(pdf())).await.unwrap();
        assert_eq!(dispatch, Dispatch::Completed(Arc::new(jane_doe())));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.step, Step::Parsed);
        assert_eq!(snapshot.step_number, 2);
        assert_eq!(snapshot.file_name.as_deref(), Some("cv.pdf"));
        assert_eq!(service.parse_count(), 1);
    }

    #[tokio::test]
    async fn test_parse_failure_leaves_state_unchanged() {
        let service = FakeService::new().into_arc();
        let controller = controller(service.clone());

        let err = controller.submit_upload(Some(pdf())).await.unwrap_err();
        assert!(matches!(err, WorkflowError::ParseFailed(_)));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.step, Step::AwaitingUpload);
        assert!(!snapshot.uploading);
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Error parsing resume. Please check your file and try again.")
        );
    }

    #[tokio::test]
    async fn test_last_selection_wins() {
        let service = FakeService::new().parsing_to(full_resume()).into_arc();
        let controller = chosen(service.clone(), "pro-classic").await;
        controller.select_template("neon-grid").await.unwrap();

        controller.submit_deploy().await.unwrap();
        let deploys = service.deploys();
        assert_eq!(deploys.len(), 1);
        assert_eq!(deploys[0].template_id, "neon-grid");
        assert_eq!(deploys[0].identifier, "Jane Doe");
        assert_eq!(deploys[0].resume_data, full_resume());
    }

    #[tokio::test]
    async fn test_unknown_template_keeps_selection() {
        let service = FakeService::new().parsing_to(full_resume()).into_arc();
        let controller = chosen(service, "pro-classic").await;

        let err = controller.select_template("infinity-flow").await.unwrap_err();
        assert_eq!(err, WorkflowError::UnknownTemplate("infinity-flow".into()));
        assert_eq!(
            controller.state().await.template().map(|t| t.id.as_str()),
            Some("pro-classic")
        );
    }

    #[tokio::test]
    async fn test_deploy_requires_a_template() {
        let service = FakeService::new().parsing_to(full_resume()).into_arc();
        let controller = controller(service.clone());
        controller.submit_upload(Some(pdf())).await.unwrap();

        let err = controller.submit_deploy().await.unwrap_err();
        assert_eq!(
            err,
            WorkflowError::InvalidTransition {
                action: "deploy",
                step: Step::Parsed
            }
        );
        assert!(service.deploys().is_empty());
    }

    #[tokio::test]
    async fn test_rapid_deploys_send_one_call() {
        let service = FakeService::new()
            .parsing_to(full_resume())
            .holding_deploys()
            .into_arc();
        let controller = chosen(service.clone(), "pro-classic").await;

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_deploy().await }
        });
        service.deploy_entered().await;

        assert_eq!(controller.submit_deploy().await, Ok(Dispatch::Ignored));
        assert_eq!(controller.submit_deploy().await, Ok(Dispatch::Ignored));
        assert!(controller.snapshot().await.deploying);
        assert_eq!(
            controller.select_template("neon-grid").await,
            Err(WorkflowError::DeployInFlight)
        );

        service.release_deploy();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, Dispatch::Completed(_)));
        assert_eq!(service.deploys().len(), 1);
        assert_eq!(controller.snapshot().await.step, Step::Deployed);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_deploy() {
        let service = FakeService::new()
            .parsing_to(full_resume())
            .holding_deploys()
            .into_arc();
        let controller = chosen(service.clone(), "pro-classic").await;

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_deploy().await }
        });
        service.deploy_entered().await;
        controller.reset().await;

        // Still one outstanding call: a new deploy cannot start yet.
        assert!(controller.snapshot().await.deploying);

        service.release_deploy();
        assert_eq!(pending.await.unwrap(), Ok(Dispatch::Superseded));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.step, Step::AwaitingUpload);
        assert!(snapshot.resume.is_none());
        assert!(snapshot.deployment.is_none());
        assert!(!snapshot.deploying);
    }

    #[tokio::test]
    async fn test_deploy_failure_keeps_selection() {
        let service = FakeService::new()
            .parsing_to(full_resume())
            .failing_deploys()
            .into_arc();
        let controller = chosen(service.clone(), "solar-verse").await;

        let err = controller.submit_deploy().await.unwrap_err();
        assert!(matches!(err, WorkflowError::DeployFailed(_)));
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.step, Step::TemplateChosen);
        assert_eq!(snapshot.template.unwrap().id, "solar-verse");
        assert_eq!(
            snapshot.notice.as_deref(),
            Some("Failed to deploy portfolio. Please try again.")
        );

        // No automatic retry; the user triggers it again.
        assert_eq!(service.deploys().len(), 1);
    }

    #[tokio::test]
    async fn test_deployed_record_carries_resume_verbatim() {
        let service = FakeService::new().parsing_to(full_resume()).into_arc();
        let controller = WorkflowController::new(
            service.clone(),
            catalog(&["pro-classic"]),
            WorkflowSettings {
                public_origin: Some(Url::parse("https://folio.example").unwrap()),
                ..WorkflowSettings::default()
            },
        );
        controller.submit_upload(Some(pdf())).await.unwrap();
        controller.select_template("pro-classic").await.unwrap();

        let Dispatch::Completed(record) = controller.submit_deploy().await.unwrap() else {
            panic!("deploy did not complete");
        };
        assert_eq!(record.slug(), "jane_doe_1");
        assert_eq!(record.template_id(), "pro-classic");
        assert_eq!(record.resume_data(), &full_resume());
        assert!(record.deployed_at().is_some());

        let snapshot = controller.snapshot().await;
        assert_eq!(
            snapshot.share_url.as_deref(),
            Some("https://folio.example/portfolio/jane_doe_1")
        );
    }

    #[tokio::test]
    async fn test_deployed_state_only_allows_reset() {
        let service = FakeService::new().parsing_to(full_resume()).into_arc();
        let controller = chosen(service.clone(), "pro-classic").await;
        controller.submit_deploy().await.unwrap();

        assert!(controller.select_template("neon-grid").await.is_err());
        assert!(controller.submit_deploy().await.is_err());
        assert!(controller.submit_upload(Some(pdf())).await.is_err());
        assert_eq!(service.deploys().len(), 1);

        controller.reset().await;
        assert_eq!(controller.state().await, WorkflowState::AwaitingUpload);
        assert!(matches!(
            controller.submit_upload(Some(pdf())).await,
            Ok(Dispatch::Completed(_))
        ));
    }

    #[tokio::test]
    async fn test_preview_renders_selected_template() {
        let service = FakeService::new().parsing_to(jane_doe()).into_arc();
        let controller = controller(service);
        let registry = RendererRegistry::builtin();
        assert!(controller.preview(&registry, &[]).await.is_err());

        controller.submit_upload(Some(pdf())).await.unwrap();
        controller.select_template("pro-classic").await.unwrap();
        let page = controller.preview(&registry, &[]).await.unwrap();
        assert_eq!(page.template_id, "pro-classic");
        assert_eq!(
            page.section(crate::render::SectionKind::Skills).unwrap().tags(),
            vec!["Go", "Rust"]
        );
    }
}
