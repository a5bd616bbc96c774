//! `pro-classic`: profile sidebar beside a column of accordion sections.

use std::sync::Arc;

use crate::models::ResumeData;
use crate::render::sections;
use crate::render::view::{RenderedPage, Section, SectionKind};
use crate::render::{Interaction, Renderable};

pub const ID: &str = "pro-classic";

const ACCORDIONS: [SectionKind; 4] = [
    SectionKind::Skills,
    SectionKind::Experience,
    SectionKind::Projects,
    SectionKind::Education,
];

pub struct ProClassic {
    resume: Arc<ResumeData>,
    /// Open flag per entry of `ACCORDIONS`. Skills and experience start open.
    open: [bool; 4],
}

impl ProClassic {
    pub fn new(resume: Arc<ResumeData>) -> Self {
        Self {
            resume,
            open: [true, true, false, false],
        }
    }

    pub fn boxed(resume: Arc<ResumeData>) -> Box<dyn Renderable> {
        Box::new(Self::new(resume))
    }

    fn is_open(&self, kind: SectionKind) -> bool {
        ACCORDIONS
            .iter()
            .position(|k| *k == kind)
            .map(|i| self.open[i])
            .unwrap_or(true)
    }

    fn accordion(&self, section: Option<Section>) -> Option<Section> {
        section.map(|mut s| {
            s.collapsible = true;
            s.expanded = self.is_open(s.kind);
            s
        })
    }
}

impl Renderable for ProClassic {
    fn render(&self) -> RenderedPage {
        let resume = self.resume.as_ref();
        let title = resume.name.clone().unwrap_or_else(|| "Portfolio".into());
        let mut page = RenderedPage::new(ID, title);

        page.push(Some(sections::profile(resume, "Profile")));
        page.push(sections::socials(resume, "Connect"));
        page.push(self.accordion(sections::skills(resume, "Skills & Expertise")));
        page.push(self.accordion(sections::experience(resume, "Professional Experience")));
        page.push(self.accordion(sections::projects(resume, "Projects & Portfolio")));
        page.push(self.accordion(sections::education(resume, "Education & Qualifications")));
        page
    }

    fn interact(&mut self, interaction: &Interaction) {
        if let Interaction::Toggle(kind) = interaction {
            if let Some(i) = ACCORDIONS.iter().position(|k| k == kind) {
                self.open[i] = !self.open[i];
            }
        }
    }
}
