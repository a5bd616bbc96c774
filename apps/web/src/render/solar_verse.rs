//! `solar-verse`: a 3-D solar system: the resume owner is the sun, each
//! section is a planet, and clicking a planet opens its side panel.
//!
//! The camera orbits the origin. Planets are projected with a 60° perspective
//! so the HTML layer only has to place circles.

use std::sync::Arc;

use crate::models::ResumeData;
use crate::render::sections;
use crate::render::view::{Camera, Planet, RenderedPage, Scene, SectionKind};
use crate::render::{Interaction, Renderable};

pub const ID: &str = "solar-verse";

const FOV_DEG: f32 = 60.0;
pub const DEFAULT_DISTANCE: f32 = 8.0;
const MIN_DISTANCE: f32 = 3.0;
const MAX_DISTANCE: f32 = 20.0;
const MAX_PITCH_DEG: f32 = 85.0;
/// Planets closer than this to the camera plane are not drawn.
const NEAR_PLANE: f32 = 0.1;

struct Orbit {
    kind: SectionKind,
    label: &'static str,
    position: [f32; 3],
    color: &'static str,
    size: f32,
}

const ORBITS: [Orbit; 5] = [
    Orbit { kind: SectionKind::About, label: "About", position: [3.0, 0.0, 0.0], color: "#4A90E2", size: 0.3 },
    Orbit { kind: SectionKind::Skills, label: "Skills", position: [-3.0, 1.0, 2.0], color: "#7B68EE", size: 0.4 },
    Orbit { kind: SectionKind::Experience, label: "Experience", position: [0.0, 2.0, -3.0], color: "#32CD32", size: 0.5 },
    Orbit { kind: SectionKind::Projects, label: "Projects", position: [-2.0, -1.0, -2.0], color: "#FF6347", size: 0.4 },
    Orbit { kind: SectionKind::Education, label: "Education", position: [2.0, -2.0, 1.0], color: "#DDA0DD", size: 0.3 },
];

pub struct SolarVerse {
    resume: Arc<ResumeData>,
    visible: Vec<SectionKind>,
    yaw_deg: f32,
    pitch_deg: f32,
    distance: f32,
    active: Option<SectionKind>,
}

impl SolarVerse {
    pub fn new(resume: Arc<ResumeData>) -> Self {
        let visible = sections::available_kinds(&resume);
        Self {
            resume,
            visible,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            distance: DEFAULT_DISTANCE,
            active: None,
        }
    }

    pub fn boxed(resume: Arc<ResumeData>) -> Box<dyn Renderable> {
        Box::new(Self::new(resume))
    }

    fn camera(&self) -> Camera {
        Camera {
            yaw_deg: self.yaw_deg,
            pitch_deg: self.pitch_deg,
            distance: self.distance,
        }
    }

    /// Projects a world point to `(x, y, depth)` in viewport space, or `None`
    /// when it sits behind the camera.
    fn project(&self, [x, y, z]: [f32; 3]) -> Option<(f32, f32, f32)> {
        let (sin_yaw, cos_yaw) = self.yaw_deg.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch_deg.to_radians().sin_cos();

        let xr = x * cos_yaw - z * sin_yaw;
        let zr = x * sin_yaw + z * cos_yaw;
        let yr = y * cos_pitch - zr * sin_pitch;
        let zr = y * sin_pitch + zr * cos_pitch;

        let depth = self.distance - zr;
        if depth < NEAR_PLANE {
            return None;
        }
        let focal = 1.0 / (FOV_DEG.to_radians() / 2.0).tan();
        let ndc_x = xr * focal / depth;
        let ndc_y = yr * focal / depth;
        Some((0.5 + ndc_x / 2.0, 0.5 - ndc_y / 2.0, depth))
    }

    fn planets(&self) -> Vec<Planet> {
        let focal = 1.0 / (FOV_DEG.to_radians() / 2.0).tan();
        let mut planets: Vec<Planet> = ORBITS
            .iter()
            .filter(|orbit| self.visible.contains(&orbit.kind))
            .filter_map(|orbit| {
                let (x, y, depth) = self.project(orbit.position)?;
                Some(Planet {
                    kind: orbit.kind,
                    label: orbit.label.to_string(),
                    color: orbit.color.to_string(),
                    x,
                    y,
                    radius: orbit.size * focal / depth / 2.0,
                    depth,
                    active: self.active == Some(orbit.kind),
                })
            })
            .collect();
        planets.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        planets
    }
}

impl Renderable for SolarVerse {
    fn render(&self) -> RenderedPage {
        let resume = self.resume.as_ref();
        let title = resume.name.clone().unwrap_or_else(|| "Portfolio".into());
        let mut page = RenderedPage::new(ID, title.clone());

        page.scene = Some(Scene {
            camera: self.camera(),
            sun_label: title,
            sun_caption: resume.email.clone(),
            planets: self.planets(),
        });

        match self.active {
            Some(SectionKind::About) => {
                page.push(Some(sections::profile(resume, "About Me")));
                page.push(sections::socials(resume, "Links"));
            }
            Some(SectionKind::Skills) => {
                page.push(sections::skills(resume, "Skills & Technologies"))
            }
            Some(SectionKind::Experience) => page.push(sections::experience(resume, "Experience")),
            Some(SectionKind::Projects) => page.push(sections::projects(resume, "Projects")),
            Some(SectionKind::Education) => page.push(sections::education(resume, "Education")),
            Some(SectionKind::Socials | SectionKind::Stats) | None => {}
        }
        page
    }

    fn interact(&mut self, interaction: &Interaction) {
        match interaction {
            Interaction::Open(kind) if self.visible.contains(kind) => self.active = Some(*kind),
            Interaction::Close => self.active = None,
            Interaction::Orbit { yaw_deg, pitch_deg } => {
                self.yaw_deg = (self.yaw_deg + yaw_deg).rem_euclid(360.0);
                self.pitch_deg = (self.pitch_deg + pitch_deg).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
            }
            Interaction::Zoom(delta) => {
                self.distance = (self.distance + delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
            }
            _ => {}
        }
    }
}
