//! The two content documents and their file locations.
//!
//! Each document has one structured value and two serialized forms: the JSON
//! file the admin side reads back, and the generated module the static build
//! imports. Both forms are always produced from the same value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::module::render_module;

/// Which logical document a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Projects,
    SiteConfig,
}

impl DocumentKind {
    /// Repo-relative path of the JSON form.
    pub fn json_path(self) -> &'static str {
        match self {
            DocumentKind::Projects => "content/projects.json",
            DocumentKind::SiteConfig => "content/siteConfig.json",
        }
    }

    /// Repo-relative path of the generated module form.
    pub fn module_path(self) -> &'static str {
        match self {
            DocumentKind::Projects => "data/projects.js",
            DocumentKind::SiteConfig => "data/siteConfig.js",
        }
    }

    /// Name of the export binding in the generated module.
    pub fn export_name(self) -> &'static str {
        match self {
            DocumentKind::Projects => "projects",
            DocumentKind::SiteConfig => "siteConfig",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Projects => write!(f, "projects"),
            DocumentKind::SiteConfig => write!(f, "site config"),
        }
    }
}

/// A content document with a JSON form and a generated module form.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: DocumentKind;

    /// Content shipped with the site, used when nothing has been edited yet.
    fn bundled_default() -> Self;

    /// JSON form: two-space indented, no trailing newline.
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Generated module form. Deterministic for equal values.
    fn to_module(&self) -> serde_json::Result<String> {
        let value = serde_json::to_value(self)?;
        Ok(render_module(Self::KIND.export_name(), &value))
    }
}

/// One portfolio entry.
///
/// Fields the site does not know about are kept in `extra` and written back
/// as they were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "crate::serde_utils::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub live_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::serde_utils::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(
        default,
        deserialize_with = "crate::serde_utils::nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            category: None,
            technologies: None,
            live_url: None,
            github_url: None,
            featured: None,
            image: None,
            extra: Map::new(),
        }
    }

    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }
}

/// The ordered list of portfolio entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectList(pub Vec<Project>);

impl ProjectList {
    pub fn featured(&self) -> Vec<&Project> {
        self.0.iter().filter(|p| p.is_featured()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Document for ProjectList {
    const KIND: DocumentKind = DocumentKind::Projects;

    fn bundled_default() -> Self {
        serde_json::from_str(include_str!("../../content/projects.json")).unwrap_or_default()
    }
}

/// Site-wide configuration: personal details, social links, contact
/// options, feature switches. Section order is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteConfig(pub Map<String, Value>);

impl SiteConfig {
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `personal.name`, the owner's display name.
    pub fn personal_name(&self) -> Option<&str> {
        self.section("personal")?.get("name")?.as_str()
    }
}

impl Document for SiteConfig {
    const KIND: DocumentKind = DocumentKind::SiteConfig;

    fn bundled_default() -> Self {
        serde_json::from_str(include_str!("../../content/siteConfig.json")).unwrap_or_default()
    }
}
