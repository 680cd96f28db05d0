//! Structure export as JSON or YAML

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{HierarchyNode, HierarchyTree};

/// Serialization format of an exported structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    /// `.yaml`/`.yml` targets export YAML, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Serializes a built tree into a nested document.
#[derive(Debug, Default, Clone)]
pub struct StructureExporter {
    generated_at: Option<DateTime<Utc>>,
}

impl StructureExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the export with a generation time (omitted otherwise, keeping output reproducible).
    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn export_json(&self, tree: &HierarchyTree) -> Value {
        let Some(root) = tree.root_node() else {
            return json!({
                "metadata": { "title": Value::Null, "total_nodes": 0 },
                "structure": Value::Null,
            });
        };

        let mut metadata = json!({
            "title": root.title(),
            "total_nodes": tree.len(),
        });
        if let Some(ts) = self.generated_at {
            metadata["generated_at"] = Value::String(ts.to_rfc3339());
        }

        json!({
            "metadata": metadata,
            "structure": node_json(tree, root),
        })
    }

    /// Render the export as a document in `format`. Both formats carry the same shape.
    pub fn export_document(
        &self,
        tree: &HierarchyTree,
        format: ExportFormat,
    ) -> ApplicationResult<String> {
        let value = self.export_json(tree);
        match format {
            ExportFormat::Json => {
                serde_json::to_string_pretty(&value).map_err(|e| export_err("json", e))
            }
            ExportFormat::Yaml => serde_yaml::to_string(&value).map_err(|e| export_err("yaml", e)),
        }
    }
}

fn export_err(format: &str, e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::Export {
        message: format!("serialize {}: {}", format, e),
    }
}

fn node_json(tree: &HierarchyTree, node: &HierarchyNode) -> Value {
    let children: Vec<Value> = node
        .children
        .iter()
        .filter_map(|&idx| tree.get_node(idx))
        .map(|child| node_json(tree, child))
        .collect();

    json!({
        "id": node.id(),
        "title": node.title(),
        "context": node.context(),
        "level": node.level(),
        "artifact": node.artifact_ref().as_str(),
        "placeholder": node.data.placeholder,
        "children": children,
    })
}
