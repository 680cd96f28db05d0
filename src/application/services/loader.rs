//! Source loading service
//!
//! Turns a markdown directory or a YAML structure document into raw entries.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_yaml::{Mapping, Value};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::application::error_ext::IoResultExt;
use crate::application::markdown::parse_markdown;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{normalize_component, DomainError, DomainResult, RawEntry, ID_SEPARATOR};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::{is_hidden, PathExt};

/// Options controlling directory discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// File stem (at the top of the tree) that becomes the root entry
    pub root_name: String,
    /// Extensions treated as markdown documents
    pub markdown_extensions: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            root_name: "main".to_string(),
            markdown_extensions: vec!["md".into(), "markdown".into()],
        }
    }
}

/// Non-fatal problem recorded while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub origin: String,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message)
    }
}

/// Raw entries plus the warnings collected on the way.
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub entries: Vec<RawEntry>,
    pub warnings: Vec<LoadWarning>,
}

impl LoadOutcome {
    fn warn(&mut self, origin: impl Into<String>, message: impl Into<String>) {
        let warning = LoadWarning {
            origin: origin.into(),
            message: message.into(),
        };
        warn!("skipping {}", warning);
        self.warnings.push(warning);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Directory,
    Yaml,
}

/// Service reading raw hierarchy records from disk.
pub struct SourceLoader {
    fs: Arc<dyn FileSystem>,
    options: LoaderOptions,
}

impl SourceLoader {
    pub fn new(fs: Arc<dyn FileSystem>, options: LoaderOptions) -> Self {
        Self { fs, options }
    }

    /// Directory → markdown mode, `.yaml`/`.yml` file → YAML mode.
    pub fn detect(&self, source: &Path) -> ApplicationResult<SourceKind> {
        if !self.fs.exists(source) {
            return Err(DomainError::SourceNotFound(source.to_path_buf()).into());
        }
        if self.fs.is_dir(source) {
            return Ok(SourceKind::Directory);
        }
        let yaml_exts = ["yaml".to_string(), "yml".to_string()];
        if self.fs.is_file(source) && source.has_extension_in(&yaml_exts) {
            return Ok(SourceKind::Yaml);
        }
        Err(ApplicationError::UnsupportedSource(source.to_path_buf()))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, source: &Path) -> ApplicationResult<LoadOutcome> {
        match self.detect(source)? {
            SourceKind::Directory => self.load_directory(source),
            SourceKind::Yaml => self.load_yaml(source),
        }
    }

    /// Walk `root` and yield one entry per markdown file.
    ///
    /// Unreadable files and malformed frontmatter are skipped with a warning.
    pub fn load_directory(&self, root: &Path) -> ApplicationResult<LoadOutcome> {
        debug!("load_directory: root={}", root.display());
        if !self.fs.is_dir(root) {
            return Err(DomainError::SourceNotFound(root.to_path_buf()).into());
        }

        let mut outcome = LoadOutcome::default();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let origin = e
                        .path()
                        .map(|p| p.to_slash_string())
                        .unwrap_or_else(|| root.to_slash_string());
                    outcome.warn(origin, e.to_string());
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !path.has_extension_in(&self.options.markdown_extensions) {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            let origin = relative.to_slash_string();

            let content = match self.fs.read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    outcome.warn(origin, format!("unreadable: {}", e));
                    continue;
                }
            };
            let meta = match parse_markdown(&content) {
                Ok(meta) => meta,
                Err(message) => {
                    outcome.warn(origin, message);
                    continue;
                }
            };

            outcome.entries.push(RawEntry {
                path_components: self.components_for(relative),
                title: meta.title,
                context: meta.context,
                explicit_children: None,
                order: meta.order,
                origin,
            });
        }

        debug!(
            "load_directory: {} entries, {} warnings",
            outcome.entries.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    pub fn load_yaml(&self, path: &Path) -> ApplicationResult<LoadOutcome> {
        debug!("load_yaml: path={}", path.display());
        if !self.fs.is_file(path) {
            return Err(DomainError::SourceNotFound(path.to_path_buf()).into());
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read structure file", path)?;
        Ok(parse_yaml_structure(&content, &path.to_slash_string())?)
    }

    /// Relative file path → normalized components; the top-level root file maps to none.
    fn components_for(&self, relative: &Path) -> Vec<String> {
        let stem = relative.with_extension("");
        let components: Vec<String> = stem
            .to_slash_string()
            .split('/')
            .filter(|c| !c.is_empty())
            .map(normalize_component)
            .collect();

        if components.len() == 1 && components[0] == normalize_component(&self.options.root_name) {
            return Vec::new();
        }
        components
    }
}

/// Parse a YAML structure document into raw entries.
///
/// Expected shape:
///
/// ```yaml
/// metadata:
///   title: Personal Knowledge Graph
///   description: ...
/// structure:
///   finance:
///     title: Finance
///     context: Money matters
///     order: 1
///     children:
///       invest: { title: Invest }
/// ```
///
/// `children` may also be a sequence of records carrying `key` (or `id`).
pub fn parse_yaml_structure(content: &str, origin: &str) -> DomainResult<LoadOutcome> {
    let doc: Value =
        serde_yaml::from_str(content).map_err(|e| DomainError::malformed(origin, e.to_string()))?;
    let map = doc
        .as_mapping()
        .ok_or_else(|| DomainError::malformed(origin, "document root must be a mapping"))?;
    let structure = map
        .get("structure")
        .ok_or_else(|| DomainError::malformed(origin, "missing 'structure' section"))?;
    let metadata = map.get("metadata").and_then(Value::as_mapping);

    let mut walker = YamlWalker {
        origin,
        outcome: LoadOutcome::default(),
    };

    let mut root = RawEntry::new(Vec::<String>::new()).with_origin(format!("{}:metadata", origin));
    root.title = metadata.and_then(|m| text_field(m, "title"));
    root.context = metadata.and_then(|m| text_field(m, "description"));
    walker.outcome.entries.push(root);

    let keys = walker.walk_children(structure, &[])?;
    walker.outcome.entries[0].explicit_children = Some(keys);

    debug!("parse_yaml_structure: {} entries", walker.outcome.entries.len());
    Ok(walker.outcome)
}

struct YamlWalker<'a> {
    origin: &'a str,
    outcome: LoadOutcome,
}

impl YamlWalker<'_> {
    /// Visit a `children` value; returns the normalized child keys in declaration order.
    fn walk_children(&mut self, value: &Value, ancestors: &[String]) -> DomainResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();

        match value {
            Value::Null => {}
            Value::Mapping(map) => {
                for (key, record) in map {
                    let raw_key = scalar_string(key).ok_or_else(|| {
                        self.malformed(ancestors, "record keys must be scalars")
                    })?;
                    let record = match record {
                        Value::Null => None,
                        Value::Mapping(m) => Some(m),
                        _ => {
                            return Err(self.malformed(
                                ancestors,
                                format!("record '{}' must be a mapping", raw_key),
                            ))
                        }
                    };
                    let key = self.visit(&raw_key, record, ancestors, &mut seen)?;
                    keys.push(key);
                }
            }
            Value::Sequence(items) => {
                for item in items {
                    let record = item.as_mapping().ok_or_else(|| {
                        self.malformed(ancestors, "sequence items must be mappings")
                    })?;
                    let raw_key = record
                        .get("key")
                        .and_then(scalar_string)
                        .or_else(|| {
                            record.get("id").and_then(scalar_string).and_then(|id| {
                                id.rsplit(ID_SEPARATOR).next().map(str::to_string)
                            })
                        })
                        .ok_or_else(|| self.malformed(ancestors, "record lacks a 'key' or 'id'"))?;
                    let key = self.visit(&raw_key, Some(record), ancestors, &mut seen)?;
                    keys.push(key);
                }
            }
            _ => {
                return Err(self.malformed(ancestors, "children must be a mapping or a sequence"));
            }
        }

        Ok(keys)
    }

    fn visit(
        &mut self,
        raw_key: &str,
        record: Option<&Mapping>,
        ancestors: &[String],
        seen: &mut HashSet<String>,
    ) -> DomainResult<String> {
        let key = normalize_component(raw_key);
        if key.is_empty() {
            return Err(self.malformed(ancestors, "empty record key"));
        }
        if !seen.insert(key.clone()) {
            return Err(self.malformed(
                ancestors,
                format!("sibling key '{}' collides after normalization", raw_key),
            ));
        }

        let mut components = ancestors.to_vec();
        components.push(key.clone());
        let origin = format!("{}:{}", self.origin, components.join("/"));

        if let Some(declared) = record.and_then(|r| text_field(r, "id")) {
            let computed = components.join(&ID_SEPARATOR.to_string());
            if declared != computed {
                self.outcome.warn(
                    origin.clone(),
                    format!("declared id '{}' differs from computed id '{}'", declared, computed),
                );
            }
        }

        let position = self.outcome.entries.len();
        self.outcome.entries.push(RawEntry {
            path_components: components.clone(),
            title: record.and_then(|r| text_field(r, "title")),
            context: record.and_then(|r| text_field(r, "context")),
            explicit_children: None,
            order: record.and_then(|r| r.get("order")).and_then(Value::as_i64),
            origin,
        });

        if let Some(children) = record.and_then(|r| r.get("children")) {
            let child_keys = self.walk_children(children, &components)?;
            self.outcome.entries[position].explicit_children = Some(child_keys);
        }

        Ok(key)
    }

    fn malformed(&self, ancestors: &[String], message: impl Into<String>) -> DomainError {
        let location = if ancestors.is_empty() {
            format!("{}:structure", self.origin)
        } else {
            format!("{}:{}", self.origin, ancestors.join("/"))
        };
        DomainError::malformed(location, message)
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_string)
}
