//! Section builders shared by the template variants.
//!
//! Each builder returns `None` when the resume has nothing to show, so a missing
//! field or an empty list drops the whole section instead of rendering a shell.

use url::Url;

use crate::models::ResumeData;
use crate::render::view::{Block, Section, SectionKind};

/// Contact lines and profile heading. Always present; a resume without a name
/// still gets an avatar initial.
pub fn profile(resume: &ResumeData, heading: &str) -> Section {
    let mut blocks = vec![Block::Tag {
        label: resume.initial().to_string(),
    }];
    if let Some(name) = &resume.name {
        blocks.push(Block::Heading { text: name.clone() });
    }
    let contacts = [
        ("Email", &resume.email),
        ("Phone", &resume.phone),
        ("Location", &resume.location),
    ];
    for (label, value) in contacts {
        if let Some(value) = value {
            blocks.push(Block::Field {
                label: label.to_string(),
                value: value.clone(),
            });
        }
    }
    Section::new(SectionKind::About, heading, blocks)
}

/// Platforms with a usable URL, in the mapping's order.
pub fn socials(resume: &ResumeData, heading: &str) -> Option<Section> {
    let blocks: Vec<Block> = resume
        .socials
        .links()
        .map(|(platform, url)| Block::Link {
            label: capitalize(platform),
            href: safe_href(url),
        })
        .collect();
    non_empty(SectionKind::Socials, heading, blocks)
}

pub fn skills(resume: &ResumeData, heading: &str) -> Option<Section> {
    let blocks = resume
        .skills
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Block::Tag { label: s.clone() })
        .collect();
    non_empty(SectionKind::Skills, heading, blocks)
}

pub fn experience(resume: &ResumeData, heading: &str) -> Option<Section> {
    let blocks = resume
        .experience
        .iter()
        .map(|job| Block::Entry {
            title: job.title.clone(),
            subtitle: present(&job.company),
            meta: present(&job.duration),
            body: present(&job.description),
            link: None,
        })
        .collect();
    non_empty(SectionKind::Experience, heading, blocks)
}

pub fn projects(resume: &ResumeData, heading: &str) -> Option<Section> {
    let blocks = resume
        .projects
        .iter()
        .map(|project| Block::Entry {
            title: project.name.clone(),
            subtitle: project
                .technologies
                .as_ref()
                .map(|t| format!("Technologies: {t}")),
            meta: None,
            body: present(&project.description),
            link: project.link.as_deref().and_then(safe_href),
        })
        .collect();
    non_empty(SectionKind::Projects, heading, blocks)
}

pub fn education(resume: &ResumeData, heading: &str) -> Option<Section> {
    let blocks = resume
        .education
        .iter()
        .map(|edu| Block::Entry {
            title: edu.degree.clone(),
            subtitle: present(&edu.institution),
            meta: present(&edu.year),
            body: edu.details.clone(),
            link: None,
        })
        .collect();
    non_empty(SectionKind::Education, heading, blocks)
}

/// `"N+"` counter over a list length, with `fallback` when the list is empty.
pub fn counter(len: usize, fallback: usize, label: &str) -> Block {
    let value = if len == 0 { fallback } else { len };
    Block::Stat {
        value: format!("{value}+"),
        label: label.to_string(),
    }
}

/// Sections a navigable template can switch between, in display order.
pub fn available_kinds(resume: &ResumeData) -> Vec<SectionKind> {
    let mut kinds = vec![SectionKind::About];
    if resume.skills.iter().any(|s| !s.trim().is_empty()) {
        kinds.push(SectionKind::Skills);
    }
    if !resume.experience.is_empty() {
        kinds.push(SectionKind::Experience);
    }
    if !resume.projects.is_empty() {
        kinds.push(SectionKind::Projects);
    }
    if !resume.education.is_empty() {
        kinds.push(SectionKind::Education);
    }
    kinds
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn non_empty(kind: SectionKind, heading: &str, blocks: Vec<Block>) -> Option<Section> {
    (!blocks.is_empty()).then(|| Section::new(kind, heading, blocks))
}

fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Upper-cases the first letter: `github` → `Github`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalizes a link target. Bare hosts such as `github.com/jane` get an
/// `https://` scheme; anything that is not http(s) or mailto is dropped.
pub fn safe_href(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{raw}")).ok()?
        }
        Err(_) => return None,
    };
    matches!(url.scheme(), "http" | "https" | "mailto").then(|| url.to_string())
}
