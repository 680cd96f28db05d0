//! Domain entities: raw source records and node payloads

use std::fmt;

use serde::Serialize;

/// Character joining path components into a node id.
pub const ID_SEPARATOR: char = '_';

/// One record discovered by a source loader.
///
/// `path_components` are already normalized; the empty sequence denotes the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub path_components: Vec<String>,
    pub title: Option<String>,
    pub context: Option<String>,
    /// Declared order of child keys (YAML mode)
    pub explicit_children: Option<Vec<String>>,
    /// Explicit position among siblings, authoritative when present
    pub order: Option<i64>,
    /// Human-readable origin used in error messages (file path or key path)
    pub origin: String,
}

impl RawEntry {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path_components: Vec<String> = components.into_iter().map(Into::into).collect();
        let origin = if path_components.is_empty() {
            "<root>".to_string()
        } else {
            path_components.join("/")
        };
        Self {
            path_components,
            origin,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_explicit_children<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_children = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }
}

/// Identifier of the generated document for a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn for_id(id: &str, extension: &str) -> Self {
        Self(format!("{}.{}", id, extension))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Data payload for hierarchy nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub id: String,
    pub title: String,
    pub context: Option<String>,
    /// Depth from root (root = 0)
    pub level: usize,
    /// Normalized path components
    pub path: Vec<String>,
    pub artifact_ref: ArtifactRef,
    /// Source record this node came from, None for placeholders
    pub origin: Option<String>,
    pub placeholder: bool,
}

impl NodeData {
    /// Origin for error messages; placeholders have none.
    pub fn source_label(&self) -> String {
        self.origin
            .clone()
            .unwrap_or_else(|| "<placeholder>".to_string())
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.id)
    }
}

/// Normalize a raw name into a path component.
///
/// Trims, lowercases and collapses inner whitespace runs into `-`.
pub fn normalize_component(raw: &str) -> String {
    raw.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Humanize a path component for display: `-`/`_` become spaces, words capitalized.
///
/// `"deep-work"` → `"Deep Work"`
pub fn humanize(component: &str) -> String {
    component
        .split(|c: char| c == '-' || c == ID_SEPARATOR || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Trim free text; empty becomes absent.
pub fn clean_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
