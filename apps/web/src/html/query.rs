//! Interaction state carried in the query string.
//!
//! Renderers are rebuilt on every request, so a link encodes the complete
//! gesture history needed to reach the next view: `?panel=skills`,
//! `?toggle=skills,projects`, `?yaw=30&pitch=-15&zoom=-2`.

use serde::Deserialize;
use tracing::debug;
use url::form_urlencoded;

use crate::render::{Interaction, SectionKind};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    /// Active tab, planet or panel.
    pub panel: Option<String>,
    /// Comma-separated sections whose accordion was flipped.
    pub toggle: Option<String>,
    /// Camera yaw and pitch away from the initial view, in degrees.
    pub yaw: f32,
    pub pitch: f32,
    /// Camera distance away from the initial view.
    pub zoom: f32,
}

impl ViewQuery {
    pub fn panel_kind(&self) -> Option<SectionKind> {
        self.panel.as_deref().and_then(parse_kind)
    }

    pub fn toggled(&self) -> Vec<SectionKind> {
        self.toggle
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(parse_kind)
            .collect()
    }

    /// Gestures to replay on a fresh renderer.
    pub fn interactions(&self) -> Vec<Interaction> {
        let mut interactions: Vec<Interaction> =
            self.toggled().into_iter().map(Interaction::Toggle).collect();
        if self.yaw.is_finite() && self.pitch.is_finite() && (self.yaw != 0.0 || self.pitch != 0.0)
        {
            interactions.push(Interaction::Orbit {
                yaw_deg: self.yaw,
                pitch_deg: self.pitch,
            });
        }
        if self.zoom.is_finite() && self.zoom != 0.0 {
            interactions.push(Interaction::Zoom(self.zoom));
        }
        if let Some(kind) = self.panel_kind() {
            interactions.push(Interaction::Open(kind));
        }
        interactions
    }

    /// Same view with `kind`'s accordion flipped once more.
    pub fn with_toggle(&self, kind: SectionKind) -> Self {
        let mut toggled = self.toggled();
        match toggled.iter().position(|k| *k == kind) {
            Some(i) => {
                toggled.remove(i);
            }
            None => toggled.push(kind),
        }
        let toggle = (!toggled.is_empty()).then(|| {
            toggled
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(",")
        });
        Self {
            toggle,
            ..self.clone()
        }
    }

    pub fn with_panel(&self, kind: Option<SectionKind>) -> Self {
        Self {
            panel: kind.map(|k| k.as_str().to_string()),
            ..self.clone()
        }
    }

    /// Same view with an absolute camera offset.
    pub fn with_camera(&self, yaw: f32, pitch: f32, zoom: f32) -> Self {
        Self {
            yaw,
            pitch,
            zoom,
            ..self.clone()
        }
    }

    /// `base` with this state appended as a query string.
    pub fn href(&self, base: &str) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(panel) = self.panel_kind() {
            query.append_pair("panel", panel.as_str());
        }
        if let Some(toggle) = &self.toggle {
            query.append_pair("toggle", toggle);
        }
        for (key, value) in [("yaw", self.yaw), ("pitch", self.pitch), ("zoom", self.zoom)] {
            if value.is_finite() && value != 0.0 {
                query.append_pair(key, &value.to_string());
            }
        }
        let query = query.finish();
        if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        }
    }
}

fn parse_kind(raw: &str) -> Option<SectionKind> {
    match raw.parse() {
        Ok(kind) => Some(kind),
        Err(unknown) => {
            debug!("Ignoring unknown section {unknown:?} in query");
            None
        }
    }
}
