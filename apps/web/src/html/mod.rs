//! HTML pages. Handlebars templates over the workflow snapshot and the render
//! tree.
//!
//! Every value reaches the markup through `{{…}}`, so resume text is always
//! escaped. Interaction links are computed here from the incoming
//! [`ViewQuery`].

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::catalog::TemplateCatalog;
use crate::models::{DeploymentRecord, ResumeData, Template, UploadConstraints};
use crate::render::{solar_verse, Block, RenderedPage, Scene, SectionKind};
use crate::workflow::{Step, WorkflowSnapshot};

pub mod query;

pub use query::ViewQuery;

const LAYOUT: &str = include_str!("templates/layout.hbs");
const BLOCK: &str = include_str!("templates/block.hbs");
const WORKFLOW: &str = include_str!("templates/workflow.hbs");
const PORTFOLIO: &str = include_str!("templates/portfolio.hbs");
const NOT_FOUND: &str = include_str!("templates/not_found.hbs");

const SCENE_WIDTH: f32 = 1000.0;
const SCENE_HEIGHT: f32 = 600.0;
const SUN_RADIUS: f32 = 40.0;
const MIN_PLANET_RADIUS: f32 = 4.0;
const ORBIT_STEP_DEG: f32 = 30.0;
const TILT_STEP_DEG: f32 = 15.0;
const ZOOM_STEP: f32 = 1.0;

pub struct PageRenderer {
    hbs: Handlebars<'static>,
}

/// Where a rendered portfolio is served and what wraps it.
pub struct PortfolioFrame<'a> {
    pub base_path: &'a str,
    pub query: &'a ViewQuery,
    /// Set when the page previews an undeployed selection.
    pub preview: Option<Preview<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Preview<'a> {
    pub template_name: &'a str,
    pub deploying: bool,
}

impl PageRenderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut hbs = Handlebars::new();
        hbs.register_escape_fn(escape_html);
        hbs.register_partial("layout", LAYOUT)?;
        hbs.register_partial("block", BLOCK)?;
        hbs.register_template_string("workflow", WORKFLOW)?;
        hbs.register_template_string("portfolio", PORTFOLIO)?;
        hbs.register_template_string("not_found", NOT_FOUND)?;
        Ok(Self { hbs })
    }

    /// The step page for the current session.
    pub fn workflow(
        &self,
        snapshot: &WorkflowSnapshot,
        catalog: &TemplateCatalog,
        constraints: &UploadConstraints,
    ) -> Result<String, RenderError> {
        let choosing = matches!(snapshot.step, Step::Parsed | Step::TemplateChosen);
        let selected = snapshot.template.as_ref().map(|t| t.id.as_str());

        let context = WorkflowContext {
            title: "Portfolio Maker",
            body_class: "workflow",
            step: snapshot.step,
            steps: [
                Step::AwaitingUpload,
                Step::Parsed,
                Step::TemplateChosen,
                Step::Deployed,
            ]
            .into_iter()
            .map(|step| StepView {
                number: step.number(),
                reached: snapshot.step_number >= step.number(),
                current: snapshot.step == step,
            })
            .collect(),
            notice: snapshot.notice.as_deref(),
            uploading: snapshot.uploading,
            deploying: snapshot.deploying,
            accept: constraints.accept_attribute(),
            max_upload_mb: megabytes(constraints.max_bytes),
            summary: snapshot
                .resume
                .as_deref()
                .filter(|_| choosing)
                .map(Summary::of),
            choosing,
            catalog_unavailable: catalog.is_unavailable(),
            templates: catalog
                .templates()
                .iter()
                .map(|template| TemplateCard {
                    template,
                    selected: selected == Some(template.id.as_str()),
                    // Catalog ids are registry ids, which are path-safe.
                    select_action: format!("/templates/{}/select", template.id),
                })
                .collect(),
            template: snapshot.template.as_ref(),
            deployment: snapshot.deployment.as_ref(),
            share_url: snapshot.share_url.as_deref(),
        };
        self.hbs.render("workflow", &context)
    }

    /// A rendered portfolio, with links that replay the next interaction.
    pub fn portfolio(
        &self,
        page: &RenderedPage,
        frame: PortfolioFrame<'_>,
    ) -> Result<String, RenderError> {
        let PortfolioFrame {
            base_path,
            query,
            preview,
        } = frame;

        let navigation = page
            .navigation
            .iter()
            .map(|item| NavLink {
                label: &item.label,
                active: item.active,
                href: query.with_panel(Some(item.kind)).href(base_path),
            })
            .collect();

        let sections = page
            .sections
            .iter()
            .map(|section| SectionView {
                kind: section.kind,
                heading: &section.heading,
                expanded: section.expanded,
                blocks: &section.blocks,
                toggle_href: section
                    .collapsible
                    .then(|| query.with_toggle(section.kind).href(base_path)),
            })
            .collect();

        let scene = page
            .scene
            .as_ref()
            .map(|scene| SceneView::new(scene, query, base_path));
        let close_href = page
            .scene
            .as_ref()
            .filter(|scene| scene.planets.iter().any(|p| p.active))
            .map(|_| query.with_panel(None).href(base_path));

        let context = PortfolioContext {
            title: &page.title,
            body_class: format!("tpl-{}", page.template_id),
            template_id: &page.template_id,
            navigation,
            sections,
            scene,
            close_href,
            preview,
        };
        self.hbs.render("portfolio", &context)
    }

    pub fn not_found(&self, home_path: &str) -> Result<String, RenderError> {
        self.hbs.render(
            "not_found",
            &NotFoundContext {
                title: "Portfolio Not Found",
                body_class: "not-found",
                home_path,
            },
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Template contexts
// ────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct WorkflowContext<'a> {
    title: &'static str,
    body_class: &'static str,
    step: Step,
    steps: Vec<StepView>,
    notice: Option<&'a str>,
    uploading: bool,
    deploying: bool,
    accept: String,
    max_upload_mb: String,
    summary: Option<Summary<'a>>,
    choosing: bool,
    catalog_unavailable: bool,
    templates: Vec<TemplateCard<'a>>,
    template: Option<&'a Template>,
    deployment: Option<&'a DeploymentRecord>,
    share_url: Option<&'a str>,
}

#[derive(Serialize)]
struct StepView {
    number: u8,
    reached: bool,
    current: bool,
}

#[derive(Serialize)]
struct TemplateCard<'a> {
    template: &'a Template,
    selected: bool,
    select_action: String,
}

#[derive(Serialize)]
struct SummaryField<'a> {
    label: &'static str,
    value: &'a str,
}

/// Parsed data as shown right after upload; missing values read "Not found".
#[derive(Serialize)]
struct Summary<'a> {
    fields: Vec<SummaryField<'a>>,
    skills: Vec<&'a str>,
}

impl<'a> Summary<'a> {
    fn of(resume: &'a ResumeData) -> Self {
        let field = |label, value: &'a Option<String>| SummaryField {
            label,
            value: value.as_deref().unwrap_or("Not found"),
        };
        Self {
            fields: vec![
                field("Name", &resume.name),
                field("Email", &resume.email),
                field("Phone", &resume.phone),
                field("Location", &resume.location),
            ],
            skills: resume
                .skills
                .iter()
                .map(String::as_str)
                .filter(|s| !s.trim().is_empty())
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct PortfolioContext<'a> {
    title: &'a str,
    body_class: String,
    template_id: &'a str,
    navigation: Vec<NavLink<'a>>,
    sections: Vec<SectionView<'a>>,
    scene: Option<SceneView<'a>>,
    close_href: Option<String>,
    preview: Option<Preview<'a>>,
}

#[derive(Serialize)]
struct NavLink<'a> {
    label: &'a str,
    active: bool,
    href: String,
}

#[derive(Serialize)]
struct SectionView<'a> {
    kind: SectionKind,
    heading: &'a str,
    expanded: bool,
    blocks: &'a [Block],
    toggle_href: Option<String>,
}

#[derive(Serialize)]
struct SceneView<'a> {
    width: f32,
    height: f32,
    sun_x: f32,
    sun_y: f32,
    sun_r: f32,
    caption_y: f32,
    subcaption_y: f32,
    sun_label: &'a str,
    sun_caption: Option<&'a str>,
    planets: Vec<PlanetView<'a>>,
    controls: Vec<Control>,
}

#[derive(Serialize)]
struct PlanetView<'a> {
    label: &'a str,
    color: &'a str,
    cx: f32,
    cy: f32,
    r: f32,
    label_y: f32,
    active: bool,
    href: String,
}

#[derive(Serialize)]
struct Control {
    label: &'static str,
    href: String,
}

impl<'a> SceneView<'a> {
    fn new(scene: &'a Scene, query: &ViewQuery, base_path: &str) -> Self {
        let planets = scene
            .planets
            .iter()
            .map(|planet| {
                let r = round1((planet.radius * SCENE_HEIGHT).max(MIN_PLANET_RADIUS));
                let cy = round1(planet.y * SCENE_HEIGHT);
                PlanetView {
                    label: &planet.label,
                    color: &planet.color,
                    cx: round1(planet.x * SCENE_WIDTH),
                    cy,
                    r,
                    label_y: round1(cy + r + 16.0),
                    active: planet.active,
                    href: query.with_panel(Some(planet.kind)).href(base_path),
                }
            })
            .collect();

        let camera = &scene.camera;
        let zoom = camera.distance - solar_verse::DEFAULT_DISTANCE;
        let moved = |yaw: f32, pitch: f32, zoom: f32| {
            query.with_camera(yaw, pitch, zoom).href(base_path)
        };
        let controls = vec![
            Control {
                label: "Rotate left",
                href: moved(camera.yaw_deg - ORBIT_STEP_DEG, camera.pitch_deg, zoom),
            },
            Control {
                label: "Rotate right",
                href: moved(camera.yaw_deg + ORBIT_STEP_DEG, camera.pitch_deg, zoom),
            },
            Control {
                label: "Tilt up",
                href: moved(camera.yaw_deg, camera.pitch_deg + TILT_STEP_DEG, zoom),
            },
            Control {
                label: "Tilt down",
                href: moved(camera.yaw_deg, camera.pitch_deg - TILT_STEP_DEG, zoom),
            },
            Control {
                label: "Zoom in",
                href: moved(camera.yaw_deg, camera.pitch_deg, zoom - ZOOM_STEP),
            },
            Control {
                label: "Zoom out",
                href: moved(camera.yaw_deg, camera.pitch_deg, zoom + ZOOM_STEP),
            },
            Control {
                label: "Reset view",
                href: moved(0.0, 0.0, 0.0),
            },
        ];

        let center_y = SCENE_HEIGHT / 2.0;
        Self {
            width: SCENE_WIDTH,
            height: SCENE_HEIGHT,
            sun_x: SCENE_WIDTH / 2.0,
            sun_y: center_y,
            sun_r: SUN_RADIUS,
            caption_y: center_y + SUN_RADIUS + 20.0,
            subcaption_y: center_y + SUN_RADIUS + 38.0,
            sun_label: &scene.sun_label,
            sun_caption: scene.sun_caption.as_deref(),
            planets,
            controls,
        }
    }
}

#[derive(Serialize)]
struct NotFoundContext<'a> {
    title: &'static str,
    body_class: &'static str,
    home_path: &'a str,
}

/// Handlebars escaping with `=` restored, so query strings in `href`s stay
/// readable. Both forms decode to the same attribute value.
fn escape_html(data: &str) -> String {
    handlebars::html_escape(data).replace("&#x3D;", "=")
}

fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// `10485760` → `"10"`, `1572864` → `"1.5"`.
fn megabytes(bytes: usize) -> String {
    let mb = format!("{:.1}", bytes as f64 / (1024.0 * 1024.0));
    mb.strip_suffix(".0").map(str::to_string).unwrap_or(mb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{full_resume, jane_doe};
    use crate::models::Socials;
    use crate::render::{Interaction, RendererRegistry};
    use crate::service::fake::template;
    use std::sync::Arc;

    fn renderer() -> PageRenderer {
        PageRenderer::new().unwrap()
    }

    fn snapshot(step: Step) -> WorkflowSnapshot {
        WorkflowSnapshot {
            step,
            step_number: step.number(),
            resume: None,
            template: None,
            deployment: None,
            share_url: None,
            file_name: None,
            uploading: false,
            deploying: false,
            notice: None,
        }
    }

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::from_descriptors(
            vec![template("pro-classic"), template("solar-verse")],
            &RendererRegistry::builtin(),
        )
    }

    fn render_portfolio(page: &RenderedPage, query: &ViewQuery) -> String {
        renderer()
            .portfolio(
                page,
                PortfolioFrame {
                    base_path: "/portfolio/jane",
                    query,
                    preview: None,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_upload_step_page() {
        let html = renderer()
            .workflow(
                &snapshot(Step::AwaitingUpload),
                &catalog(),
                &UploadConstraints::default(),
            )
            .unwrap();
        assert!(html.contains(r#"accept=".pdf,.docx""#));
        assert!(html.contains("up to 10 MB"));
        assert!(html.contains(r#"action="/upload""#));
        assert!(!html.contains("/reset"));
    }

    #[test]
    fn test_parsed_summary_placeholders() {
        let mut snap = snapshot(Step::Parsed);
        snap.resume = Some(Arc::new(ResumeData {
            name: Some("Jane Doe".into()),
            ..ResumeData::default()
        }));
        snap.notice = Some("Failed to deploy portfolio. Please try again.".into());
        let html = renderer()
            .workflow(&snap, &catalog(), &UploadConstraints::default())
            .unwrap();
        assert!(html.contains("<strong>Name:</strong> Jane Doe"));
        assert!(html.contains("<strong>Email:</strong> Not found"));
        assert!(html.contains("No skills found"));
        assert!(html.contains(r#"action="/templates/solar-verse/select""#));
        assert!(html.contains(r#"role="alert""#));
    }

    #[test]
    fn test_unavailable_catalog_message() {
        let mut snap = snapshot(Step::Parsed);
        snap.resume = Some(Arc::new(jane_doe()));
        let html = renderer()
            .workflow(
                &snap,
                &TemplateCatalog::unavailable(),
                &UploadConstraints::default(),
            )
            .unwrap();
        assert!(html.contains("Templates could not be loaded right now."));
    }

    #[test]
    fn test_deployed_step_links() {
        let mut snap = snapshot(Step::Deployed);
        snap.deployment = Some(DeploymentRecord::new(
            "jane_doe_1",
            "pro-classic",
            jane_doe(),
            "/portfolio/jane_doe_1",
        ));
        snap.share_url = Some("https://folio.example/portfolio/jane_doe_1".into());
        let html = renderer()
            .workflow(&snap, &catalog(), &UploadConstraints::default())
            .unwrap();
        assert!(html.contains("<code>https://folio.example/portfolio/jane_doe_1</code>"));
        assert!(html.contains(r#"href="/portfolio/jane_doe_1""#));
        assert!(html.contains("Create Another"));
    }

    #[test]
    fn test_resume_text_is_escaped() {
        let resume = ResumeData {
            name: Some("<script>alert(1)</script>".into()),
            skills: vec!["C & C++".into()],
            ..ResumeData::default()
        };
        let page = RendererRegistry::builtin()
            .render("pro-classic", Arc::new(resume))
            .unwrap();
        let html = render_portfolio(&page, &ViewQuery::default());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("C &amp; C++"));
    }

    #[test]
    fn test_unsafe_social_renders_label_only() {
        let socials: Socials = [("github", Some("javascript:alert(1)"))].into_iter().collect();
        let resume = ResumeData {
            socials,
            ..ResumeData::default()
        };
        let page = RendererRegistry::builtin()
            .render("pro-classic", Arc::new(resume))
            .unwrap();
        let html = render_portfolio(&page, &ViewQuery::default());
        assert!(html.contains(r#"<span class="social">Github</span>"#));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_accordion_links_flip_state() {
        let page = RendererRegistry::builtin()
            .render("pro-classic", Arc::new(full_resume()))
            .unwrap();
        let html = render_portfolio(&page, &ViewQuery::default());
        assert!(html.contains(r#"href="/portfolio/jane?toggle=projects""#));
        assert!(html.contains(r#"href="/portfolio/jane?toggle=skills""#));
        // Collapsed sections hide their entries.
        assert!(!html.contains("Ledger"));
        assert!(html.contains("Staff Engineer"));
    }

    #[test]
    fn test_tabs_link_to_panels() {
        let query = ViewQuery::default().with_panel(Some(SectionKind::Skills));
        let page = RendererRegistry::builtin()
            .render_with("neon-grid", Arc::new(full_resume()), &query.interactions())
            .unwrap();
        let html = render_portfolio(&page, &query);
        assert!(html.contains(r#"<a href="/portfolio/jane?panel=skills" class="active">Skills</a>"#));
        assert!(html.contains(r#"href="/portfolio/jane?panel=projects""#));
    }

    #[test]
    fn test_scene_renders_planets_and_controls() {
        let query = ViewQuery::default().with_panel(Some(SectionKind::Experience));
        let page = RendererRegistry::builtin()
            .render_with("solar-verse", Arc::new(full_resume()), &query.interactions())
            .unwrap();
        let html = render_portfolio(&page, &query);
        assert!(html.contains("<svg class=\"scene\""));
        assert_eq!(html.matches("<circle").count(), 6);
        assert!(html.contains(r#"href="/portfolio/jane?panel=experience&amp;yaw=30""#));
        assert!(html.contains(r#"<a href="/portfolio/jane">Close</a>"#));
        assert!(html.contains("Staff Engineer"));
    }

    #[test]
    fn test_preview_banner() {
        let page = RendererRegistry::builtin()
            .render_with("infinity-flow", Arc::new(jane_doe()), &[Interaction::Close])
            .unwrap();
        let html = renderer()
            .portfolio(
                &page,
                PortfolioFrame {
                    base_path: "/preview",
                    query: &ViewQuery::default(),
                    preview: Some(Preview {
                        template_name: "Infinity Flow",
                        deploying: false,
                    }),
                },
            )
            .unwrap();
        assert!(html.contains("Previewing <strong>Infinity Flow</strong>"));
        assert!(html.contains(r#"action="/deploy""#));
        assert!(html.contains("5+"));
    }

    #[test]
    fn test_not_found_links_home() {
        let html = renderer().not_found("/").unwrap();
        assert!(html.contains("Portfolio Not Found"));
        assert!(html.contains(r#"<a href="/">Create Your Portfolio</a>"#));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x?a=1&b='2'">"#),
            "&lt;a href=&quot;x?a=1&amp;b=&#x27;2&#x27;&quot;&gt;"
        );
        assert_eq!(escape_html("`x`"), "&#x60;x&#x60;");
        assert_eq!(escape_html("a&#x3D;b"), "a&amp;#x3D;b");
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(megabytes(10 * 1024 * 1024), "10");
        assert_eq!(megabytes(1536 * 1024), "1.5");
    }
}
