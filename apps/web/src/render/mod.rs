//! Template rendering, one [`Renderable`] implementation per template id.
//!
//! Variants are picked through [`RendererRegistry`] by id. Each instance owns
//! its interaction state (open accordions, active panel, camera orbit); that
//! state starts fresh every time a renderer is built and never leaves it.

use std::sync::Arc;

use crate::models::ResumeData;

pub mod infinity_flow;
pub mod neon_grid;
pub mod pro_classic;
pub mod sections;
pub mod solar_verse;
pub mod view;

pub use view::{Block, Camera, NavItem, Planet, RenderedPage, Scene, Section, SectionKind};

/// A user gesture applied to a renderer's private state. Variants ignore
/// gestures they have no use for.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Flip an accordion section open or closed.
    Toggle(SectionKind),
    /// Make a panel, tab or planet the active one.
    Open(SectionKind),
    /// Dismiss the active panel.
    Close,
    /// Rotate the camera around the scene, in degrees.
    Orbit { yaw_deg: f32, pitch_deg: f32 },
    /// Move the camera towards (negative) or away from (positive) the centre.
    Zoom(f32),
}

/// Capability shared by every template variant.
pub trait Renderable: Send {
    fn render(&self) -> RenderedPage;

    /// Applies one gesture. Scroll-only pages keep the default no-op.
    fn interact(&mut self, _interaction: &Interaction) {}
}

/// Builds a fresh renderer over a resume.
pub type RendererFactory = fn(Arc<ResumeData>) -> Box<dyn Renderable>;

/// Template id → renderer factory, in registration order.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    entries: Vec<(&'static str, RendererFactory)>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every variant that ships with the app.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(pro_classic::ID, pro_classic::ProClassic::boxed);
        registry.register(neon_grid::ID, neon_grid::NeonGrid::boxed);
        registry.register(solar_verse::ID, solar_verse::SolarVerse::boxed);
        registry.register(infinity_flow::ID, infinity_flow::InfinityFlow::boxed);
        registry
    }

    /// Registers `factory` under `id`, replacing any earlier registration.
    pub fn register(&mut self, id: &'static str, factory: RendererFactory) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = factory,
            None => self.entries.push((id, factory)),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factory(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// A new renderer instance for `id`, or `None` when nothing is registered.
    pub fn create(&self, id: &str, resume: Arc<ResumeData>) -> Option<Box<dyn Renderable>> {
        self.factory(id).map(|factory| factory(resume))
    }

    pub fn render(&self, id: &str, resume: Arc<ResumeData>) -> Option<RenderedPage> {
        self.render_with(id, resume, &[])
    }

    /// Builds a fresh instance, replays `interactions` in order, then renders.
    pub fn render_with(
        &self,
        id: &str,
        resume: Arc<ResumeData>,
        interactions: &[Interaction],
    ) -> Option<RenderedPage> {
        let mut renderer = self.create(id, resume)?;
        for interaction in interactions {
            renderer.interact(interaction);
        }
        Some(renderer.render())
    }

    fn factory(&self, id: &str) -> Option<RendererFactory> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, factory)| *factory)
    }
}
