//! `neon-grid`: tab bar over one active panel.

use std::sync::Arc;

use crate::models::ResumeData;
use crate::render::sections;
use crate::render::view::{NavItem, RenderedPage, SectionKind};
use crate::render::{Interaction, Renderable};

pub const ID: &str = "neon-grid";

pub struct NeonGrid {
    resume: Arc<ResumeData>,
    tabs: Vec<SectionKind>,
    active: SectionKind,
}

impl NeonGrid {
    pub fn new(resume: Arc<ResumeData>) -> Self {
        let tabs = sections::available_kinds(&resume);
        Self {
            resume,
            tabs,
            active: SectionKind::About,
        }
    }

    pub fn boxed(resume: Arc<ResumeData>) -> Box<dyn Renderable> {
        Box::new(Self::new(resume))
    }
}

fn tab_label(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::About => "About",
        SectionKind::Skills => "Skills",
        SectionKind::Experience => "Experience",
        SectionKind::Projects => "Projects",
        SectionKind::Education => "Education",
        SectionKind::Socials => "Connect",
        SectionKind::Stats => "Stats",
    }
}

impl Renderable for NeonGrid {
    fn render(&self) -> RenderedPage {
        let resume = self.resume.as_ref();
        let title = resume.name.clone().unwrap_or_else(|| "Portfolio".into());
        let mut page = RenderedPage::new(ID, title);

        page.navigation = self
            .tabs
            .iter()
            .map(|&kind| NavItem {
                kind,
                label: tab_label(kind).to_string(),
                active: kind == self.active,
            })
            .collect();

        match self.active {
            SectionKind::About => {
                page.push(Some(sections::profile(resume, "About Me")));
                page.push(sections::socials(resume, "Connect"));
            }
            SectionKind::Skills => page.push(sections::skills(resume, "Technical Skills")),
            SectionKind::Experience => {
                page.push(sections::experience(resume, "Work Experience"))
            }
            SectionKind::Projects => page.push(sections::projects(resume, "Featured Projects")),
            SectionKind::Education => page.push(sections::education(resume, "Education")),
            SectionKind::Socials | SectionKind::Stats => {}
        }
        page
    }

    fn interact(&mut self, interaction: &Interaction) {
        if let Interaction::Open(kind) = interaction {
            if self.tabs.contains(kind) {
                self.active = *kind;
            }
        }
    }
}
