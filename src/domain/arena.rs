use std::collections::{BTreeMap, HashMap};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{ArtifactRef, NodeData};
use crate::domain::error::{DomainError, DomainResult};

/// Node in the arena-based hierarchy.
#[derive(Debug)]
pub struct HierarchyNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in display order
    pub children: Vec<Index>,
}

impl HierarchyNode {
    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    pub fn context(&self) -> Option<&str> {
        self.data.context.as_deref()
    }

    pub fn level(&self) -> usize {
        self.data.level
    }

    pub fn artifact_ref(&self) -> &ArtifactRef {
        &self.data.artifact_ref
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena-based hierarchy with an id lookup table.
///
/// Parent links are arena handles, never owning pointers. The id table is the
/// only way to address a node from outside the tree.
#[derive(Debug, Default)]
pub struct HierarchyTree {
    arena: Arena<HierarchyNode>,
    root: Option<Index>,
    ids: HashMap<String, Index>,
}

impl HierarchyTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent`; `None` makes it the root.
    ///
    /// An id already in the table is rejected with [`DomainError::DuplicateId`].
    #[instrument(level = "trace", skip(self, data), fields(id = %data.id))]
    pub(crate) fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> DomainResult<Index> {
        if let Some(existing) = self.get(&data.id) {
            return Err(DomainError::DuplicateId {
                id: data.id.clone(),
                first: existing.data.source_label(),
                second: data.source_label(),
            });
        }

        let id = data.id.clone();
        let node = HierarchyNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        self.ids.insert(id, node_idx);
        Ok(node_idx)
    }

    pub(crate) fn get_node_mut(&mut self, idx: Index) -> Option<&mut HierarchyNode> {
        self.arena.get_mut(idx)
    }

    pub fn get_node(&self, idx: Index) -> Option<&HierarchyNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&HierarchyNode> {
        self.root.and_then(|idx| self.get_node(idx))
    }

    /// Resolve an id to its arena index.
    pub fn find(&self, id: &str) -> Option<Index> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&HierarchyNode> {
        self.find(id).and_then(|idx| self.get_node(idx))
    }

    /// Companion document lookup: `id → artifact_ref`.
    pub fn artifact_for(&self, id: &str) -> Option<&ArtifactRef> {
        self.get(id).map(HierarchyNode::artifact_ref)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Number of nodes on the longest root-to-leaf path (root alone = 1).
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of all leaf nodes in pre-order.
    pub fn leaf_nodes(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.id())
            .collect()
    }

    /// Node count per level.
    pub fn level_counts(&self) -> BTreeMap<usize, usize> {
        let mut counts = BTreeMap::new();
        for (_, node) in self.iter() {
            *counts.entry(node.level()).or_insert(0) += 1;
        }
        counts
    }
}

/// Pre-order traversal, children left to right.
pub struct TreeIterator<'a> {
    tree: &'a HierarchyTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a HierarchyTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a HierarchyTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a HierarchyTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push((root, false));
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}
