//! Hierarchy builder: turns raw entries into an addressable tree.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::HierarchyTree;
use crate::domain::entities::{clean_text, humanize, ArtifactRef, NodeData, RawEntry, ID_SEPARATOR};
use crate::domain::error::{DomainError, DomainResult};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Naming options for the built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Id assigned to the entry with zero path components
    pub root_id: String,
    /// Title used when the root has no own title
    pub root_title: String,
    /// Extension of generated documents
    pub artifact_extension: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root_id: "index".to_string(),
            root_title: "Home".to_string(),
            artifact_extension: "html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SortKey {
    order: Option<i64>,
    seq: usize,
}

/// Constructs a hierarchy from raw entries.
pub struct HierarchyBuilder {
    options: BuildOptions,
    sort_keys: HashMap<Index, SortKey>,
    explicit_children: HashMap<Index, Vec<String>>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::with_options(BuildOptions::default())
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self {
            options,
            sort_keys: HashMap::new(),
            explicit_children: HashMap::new(),
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the tree. Entries may arrive in any discovery order.
    #[instrument(level = "debug", skip(self, entries), fields(entries = entries.len()))]
    pub fn build(&mut self, entries: Vec<RawEntry>) -> TreeResult<HierarchyTree> {
        if entries.is_empty() {
            return Err(DomainError::EmptySource);
        }

        // Reset state for a fresh build
        self.sort_keys.clear();
        self.explicit_children.clear();

        for entry in &entries {
            validate_components(entry)?;
        }

        // Shallow first so parents exist before children attach; stable keeps encounter order
        let mut entries: Vec<(usize, RawEntry)> = entries.into_iter().enumerate().collect();
        entries.sort_by_key(|(_, entry)| entry.path_components.len());

        let mut tree = HierarchyTree::new();
        for (seq, entry) in entries {
            self.insert_entry(&mut tree, seq, entry)?;
        }

        self.order_children(&mut tree);
        debug!("built hierarchy with {} nodes", tree.len());
        Ok(tree)
    }

    fn insert_entry(&mut self, tree: &mut HierarchyTree, seq: usize, entry: RawEntry) -> TreeResult<()> {
        let id = self.id_for(&entry.path_components);
        if let Some(existing) = tree.get(&id) {
            return Err(DomainError::DuplicateId {
                id,
                first: existing.data.source_label(),
                second: entry.origin,
            });
        }

        let parent = match entry.path_components.split_last() {
            Some((_, ancestors)) => Some(self.ensure_node(tree, ancestors, seq, &entry.origin)?),
            None => None,
        };

        let title = clean_text(entry.title.as_deref()).unwrap_or_else(|| self.default_title(&entry.path_components));
        let data = NodeData {
            artifact_ref: ArtifactRef::for_id(&id, &self.options.artifact_extension),
            id,
            title,
            context: clean_text(entry.context.as_deref()),
            level: entry.path_components.len(),
            path: entry.path_components,
            origin: Some(entry.origin),
            placeholder: false,
        };

        // The root placeholder may have claimed this id while resolving the parent
        let idx = tree.insert_node(data, parent)?;
        self.sort_keys.insert(idx, SortKey { order: entry.order, seq });
        if let Some(keys) = entry.explicit_children {
            self.explicit_children.insert(idx, keys);
        }
        Ok(())
    }

    /// Find the node for `components`, synthesizing placeholders for missing ancestors.
    ///
    /// An id held by a node at a different path is a collision, not a match.
    fn ensure_node(
        &mut self,
        tree: &mut HierarchyTree,
        components: &[String],
        seq: usize,
        origin: &str,
    ) -> TreeResult<Index> {
        let id = self.id_for(components);
        if let Some(idx) = tree.find(&id) {
            return match tree.get_node(idx) {
                Some(existing) if existing.data.path != components => Err(DomainError::DuplicateId {
                    id,
                    first: existing.data.source_label(),
                    second: origin.to_string(),
                }),
                _ => Ok(idx),
            };
        }

        let parent = match components.split_last() {
            Some((_, ancestors)) => Some(self.ensure_node(tree, ancestors, seq, origin)?),
            None => None,
        };

        debug!("synthesizing placeholder node: {}", id);
        let data = NodeData {
            artifact_ref: ArtifactRef::for_id(&id, &self.options.artifact_extension),
            title: self.default_title(components),
            id,
            context: None,
            level: components.len(),
            path: components.to_vec(),
            origin: None,
            placeholder: true,
        };
        let idx = tree.insert_node(data, parent)?;
        self.sort_keys.insert(idx, SortKey { order: None, seq });
        Ok(idx)
    }

    /// Reorder every child list: explicit `order` first, then declared child
    /// order, then encounter order.
    fn order_children(&self, tree: &mut HierarchyTree) {
        let parents: Vec<Index> = tree.iter().map(|(idx, _)| idx).collect();

        for parent_idx in parents {
            let Some(parent) = tree.get_node(parent_idx) else {
                continue;
            };
            if parent.children.len() < 2 {
                continue;
            }
            let declared = self.explicit_children.get(&parent_idx);

            let mut keyed: Vec<((bool, i64, usize, usize), Index)> = parent
                .children
                .iter()
                .map(|&child_idx| {
                    let key = self.sort_keys.get(&child_idx).copied().unwrap_or(SortKey {
                        order: None,
                        seq: usize::MAX,
                    });
                    let declared_pos = declared
                        .zip(tree.get_node(child_idx).and_then(|c| c.data.path.last()))
                        .and_then(|(keys, last)| keys.iter().position(|k| k == last))
                        .unwrap_or(usize::MAX);
                    (
                        (key.order.is_none(), key.order.unwrap_or(0), declared_pos, key.seq),
                        child_idx,
                    )
                })
                .collect();
            keyed.sort_by_key(|(key, _)| *key);

            if let Some(parent) = tree.get_node_mut(parent_idx) {
                parent.children = keyed.into_iter().map(|(_, idx)| idx).collect();
            }
        }
    }

    fn id_for(&self, components: &[String]) -> String {
        if components.is_empty() {
            self.options.root_id.clone()
        } else {
            components.join(&ID_SEPARATOR.to_string())
        }
    }

    fn default_title(&self, components: &[String]) -> String {
        components
            .last()
            .map(|c| humanize(c))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.options.root_title.clone())
    }
}

/// Components must be non-empty, free of the id separator and path separators,
/// and never `.` or `..`, so an id always names a file inside the output directory.
fn validate_components(entry: &RawEntry) -> DomainResult<()> {
    for component in &entry.path_components {
        if component.trim().is_empty() {
            return Err(DomainError::malformed(&entry.origin, "empty path component"));
        }
        if component.contains(ID_SEPARATOR) {
            return Err(DomainError::malformed(
                &entry.origin,
                format!("path component '{}' contains the separator '{}'", component, ID_SEPARATOR),
            ));
        }
        if component.contains(['/', '\\']) {
            return Err(DomainError::malformed(
                &entry.origin,
                format!("path component '{}' contains a path separator", component),
            ));
        }
        if component == "." || component == ".." {
            return Err(DomainError::malformed(
                &entry.origin,
                format!("path component '{}' is a relative path segment", component),
            ));
        }
    }
    Ok(())
}
