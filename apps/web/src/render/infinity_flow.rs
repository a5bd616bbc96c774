//! `infinity-flow`: a single scrolling page with headline counters.
//!
//! Counters are derived from list lengths alone. When a list is empty the
//! counter shows a fixed default: 5 projects, 10 technologies, 3 years.

use std::sync::Arc;

use crate::models::ResumeData;
use crate::render::sections;
use crate::render::view::{RenderedPage, Section, SectionKind};
use crate::render::Renderable;

pub const ID: &str = "infinity-flow";

pub const DEFAULT_PROJECTS: usize = 5;
pub const DEFAULT_TECHNOLOGIES: usize = 10;
pub const DEFAULT_YEARS: usize = 3;

pub struct InfinityFlow {
    resume: Arc<ResumeData>,
}

impl InfinityFlow {
    pub fn new(resume: Arc<ResumeData>) -> Self {
        Self { resume }
    }

    pub fn boxed(resume: Arc<ResumeData>) -> Box<dyn Renderable> {
        Box::new(Self::new(resume))
    }

    fn stats(&self) -> Section {
        let resume = self.resume.as_ref();
        Section::new(
            SectionKind::Stats,
            "By the Numbers",
            vec![
                sections::counter(resume.projects.len(), DEFAULT_PROJECTS, "Projects Completed"),
                sections::counter(resume.skills.len(), DEFAULT_TECHNOLOGIES, "Technologies"),
                sections::counter(resume.experience.len(), DEFAULT_YEARS, "Years Experience"),
            ],
        )
    }
}

impl Renderable for InfinityFlow {
    fn render(&self) -> RenderedPage {
        let resume = self.resume.as_ref();
        let title = resume.name.clone().unwrap_or_else(|| "Portfolio".into());
        let mut page = RenderedPage::new(ID, title);

        page.push(Some(sections::profile(resume, "Hello, I'm")));
        page.push(sections::skills(resume, "Skills & Technologies"));
        page.push(Some(self.stats()));
        page.push(sections::experience(resume, "Experience Journey"));
        page.push(sections::projects(resume, "Featured Projects"));
        page.push(sections::education(resume, "Education"));
        page.push(sections::socials(resume, "Let's Connect"));
        page
    }
}
