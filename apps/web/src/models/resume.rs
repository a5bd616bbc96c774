//! Canonical resume schema shared by the workflow, the renderers and the viewer.
//!
//! Decoding tolerates the upstream parser's habits: blank strings decode as
//! absent, `null` lists decode as empty, and `socials` keeps the platform order
//! it was written in.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured resume as produced by the external parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub socials: Socials,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
}

impl ResumeData {
    /// Identifier sent with a deploy request: the resume's name, or `"user"`.
    pub fn deploy_identifier(&self) -> &str {
        self.name.as_deref().unwrap_or("user")
    }

    /// First letter of the name for avatar badges, `U` when there is no name.
    pub fn initial(&self) -> char {
        self.name
            .as_deref()
            .and_then(|n| n.chars().next())
            .unwrap_or('U')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub technologies: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub details: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Socials: ordered, partial platform → URL mapping
// ────────────────────────────────────────────────────────────────────────────

/// Platform → URL mapping in the order the parser wrote it.
///
/// Entries whose value was falsy (`null`, `""`, `false`, `0`) or not a string
/// are kept with `None` so the mapping stays verbatim, but [`Socials::links`]
/// never yields them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Socials(Vec<(String, Option<String>)>);

impl Socials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a platform. Blank URLs are stored as missing.
    pub fn push(&mut self, platform: impl Into<String>, url: Option<&str>) {
        let url = url.map(str::trim).filter(|u| !u.is_empty()).map(String::from);
        self.0.push((platform.into(), url));
    }

    /// Platforms with a usable URL, in mapping order.
    pub fn links(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(platform, url)| url.as_deref().map(|u| (platform.as_str(), u)))
    }

    pub fn has_links(&self) -> bool {
        self.links().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<String>, U: AsRef<str>> FromIterator<(P, Option<U>)> for Socials {
    fn from_iter<I: IntoIterator<Item = (P, Option<U>)>>(iter: I) -> Self {
        let mut socials = Socials::new();
        for (platform, url) in iter {
            socials.push(platform, url.as_ref().map(AsRef::as_ref));
        }
        socials
    }
}

impl Serialize for Socials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (platform, url) in &self.0 {
            map.serialize_entry(platform, url)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Socials {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SocialsVisitor;

        impl<'de> Visitor<'de> for SocialsVisitor {
            type Value = Socials;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of platform names to URLs")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Socials, E> {
                Ok(Socials::new())
            }

            fn visit_none<E: de::Error>(self) -> Result<Socials, E> {
                Ok(Socials::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Socials, A::Error> {
                let mut socials = Socials::new();
                while let Some((platform, value)) = access.next_entry::<String, Value>()? {
                    socials.push(platform, value.as_str());
                }
                Ok(socials)
            }
        }

        deserializer.deserialize_any(SocialsVisitor)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field decoders
// ────────────────────────────────────────────────────────────────────────────

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `technologies` arrives either as prose or as a list of names.
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Technologies {
        Text(String),
        List(Vec<String>),
    }

    let joined = match Option::<Technologies>::deserialize(deserializer)? {
        Some(Technologies::Text(text)) => text,
        Some(Technologies::List(items)) => items.join(", "),
        None => String::new(),
    };
    Ok(Some(joined).filter(|s| !s.trim().is_empty()))
}
