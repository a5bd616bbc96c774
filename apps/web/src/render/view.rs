//! Render tree produced by every template variant.
//!
//! A page is plain data: the HTML layer walks it, tests inspect it directly.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    About,
    Socials,
    Skills,
    Experience,
    Projects,
    Education,
    Stats,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::About => "about",
            SectionKind::Socials => "socials",
            SectionKind::Skills => "skills",
            SectionKind::Experience => "experience",
            SectionKind::Projects => "projects",
            SectionKind::Education => "education",
            SectionKind::Stats => "stats",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl FromStr for SectionKind {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "about" => Ok(SectionKind::About),
            "socials" => Ok(SectionKind::Socials),
            "skills" => Ok(SectionKind::Skills),
            "experience" => Ok(SectionKind::Experience),
            "projects" => Ok(SectionKind::Projects),
            "education" => Ok(SectionKind::Education),
            "stats" => Ok(SectionKind::Stats),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

/// Smallest renderable unit. Serialized with a `type` tag for the HTML layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        text: String,
    },
    Text {
        text: String,
    },
    /// Labelled value, e.g. `Email: jane@x.com`.
    Field {
        label: String,
        value: String,
    },
    Tag {
        label: String,
    },
    /// `href` is `None` when the target is not a safe web or mail address.
    Link {
        label: String,
        href: Option<String>,
    },
    Entry {
        title: String,
        subtitle: Option<String>,
        meta: Option<String>,
        body: Option<String>,
        link: Option<String>,
    },
    Stat {
        value: String,
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub heading: String,
    /// Whether the reader can fold this section away.
    pub collapsible: bool,
    /// Accordion state. Sections that are not collapsible are always expanded.
    pub expanded: bool,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(kind: SectionKind, heading: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            kind,
            heading: heading.into(),
            collapsible: false,
            expanded: true,
            blocks,
        }
    }

    /// Tag labels, in display order.
    pub fn tags(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Tag { label } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Link labels, in display order.
    pub fn link_labels(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Link { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Entry titles, in display order.
    pub fn entry_titles(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Entry { title, .. } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavItem {
    pub kind: SectionKind,
    pub label: String,
    pub active: bool,
}

/// One planet of a 3-D scene, already projected to viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Planet {
    pub kind: SectionKind,
    pub label: String,
    pub color: String,
    /// Viewport coordinates in `[0, 1]` when on screen.
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub depth: f32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub camera: Camera,
    pub sun_label: String,
    pub sun_caption: Option<String>,
    /// Far-to-near painting order.
    pub planets: Vec<Planet>,
}

/// Complete output of one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub template_id: String,
    pub title: String,
    pub navigation: Vec<NavItem>,
    pub sections: Vec<Section>,
    pub scene: Option<Scene>,
}

impl RenderedPage {
    pub fn new(template_id: &str, title: impl Into<String>) -> Self {
        Self {
            template_id: template_id.to_string(),
            title: title.into(),
            navigation: Vec::new(),
            sections: Vec::new(),
            scene: None,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.section(kind).is_some()
    }

    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    /// Appends the section when present.
    pub(crate) fn push(&mut self, section: Option<Section>) {
        self.sections.extend(section);
    }
}
