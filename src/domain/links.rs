//! Navigation views derived from a built hierarchy.

use serde::Serialize;

use crate::domain::arena::{HierarchyNode, HierarchyTree};
use crate::domain::entities::ArtifactRef;
use crate::domain::error::{DomainError, DomainResult};

/// Link to a node's generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub id: String,
    pub title: String,
    pub artifact_ref: ArtifactRef,
}

impl From<&HierarchyNode> for NavLink {
    fn from(node: &HierarchyNode) -> Self {
        Self {
            id: node.id().to_string(),
            title: node.title().to_string(),
            artifact_ref: node.artifact_ref().clone(),
        }
    }
}

/// A child link together with the links one level further down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildView {
    pub link: NavLink,
    pub grandchildren: Vec<NavLink>,
}

/// Everything a renderer needs for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub node: NavLink,
    pub context: Option<String>,
    pub level: usize,
    pub breadcrumbs: Vec<NavLink>,
    pub children: Vec<ChildView>,
    pub siblings: Vec<NavLink>,
}

/// Read-only navigation resolution over a tree.
pub struct LinkResolver<'a> {
    tree: &'a HierarchyTree,
    max_depth: usize,
}

impl<'a> LinkResolver<'a> {
    pub fn new(tree: &'a HierarchyTree) -> Self {
        Self {
            tree,
            max_depth: tree.len(),
        }
    }

    /// Override the hop limit used when walking parent chains.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Root-to-node chain, inclusive on both ends.
    pub fn breadcrumbs(&self, node: &'a HierarchyNode) -> DomainResult<Vec<&'a HierarchyNode>> {
        let detached = || DomainError::DetachedNode {
            id: node.id().to_string(),
            max_depth: self.max_depth,
        };

        let mut chain = vec![node];
        let mut current = node;
        let mut hops = 0;
        while let Some(parent_idx) = current.parent {
            hops += 1;
            if hops > self.max_depth {
                return Err(detached());
            }
            current = self.tree.get_node(parent_idx).ok_or_else(detached)?;
            chain.push(current);
        }

        let root_id = self.tree.root_node().map(HierarchyNode::id);
        if root_id != Some(current.id()) {
            return Err(detached());
        }

        chain.reverse();
        Ok(chain)
    }

    pub fn breadcrumbs_by_id(&self, id: &str) -> DomainResult<Vec<&'a HierarchyNode>> {
        self.breadcrumbs(self.lookup(id)?)
    }

    /// Direct projection of `node.children`.
    pub fn navigable_children(&self, node: &HierarchyNode) -> Vec<NavLink> {
        node.children
            .iter()
            .filter_map(|&idx| self.tree.get_node(idx))
            .map(NavLink::from)
            .collect()
    }

    /// Parent's children excluding `node`; empty for the root.
    pub fn sibling_group(&self, node: &HierarchyNode) -> Vec<NavLink> {
        let Some(parent) = node.parent.and_then(|idx| self.tree.get_node(idx)) else {
            return Vec::new();
        };
        parent
            .children
            .iter()
            .filter_map(|&idx| self.tree.get_node(idx))
            .filter(|sibling| sibling.id() != node.id())
            .map(NavLink::from)
            .collect()
    }

    pub fn page_view(&self, node: &'a HierarchyNode) -> DomainResult<PageView> {
        let breadcrumbs = self.breadcrumbs(node)?.into_iter().map(NavLink::from).collect();
        let children = node
            .children
            .iter()
            .filter_map(|&idx| self.tree.get_node(idx))
            .map(|child| ChildView {
                link: NavLink::from(child),
                grandchildren: self.navigable_children(child),
            })
            .collect();

        Ok(PageView {
            node: NavLink::from(node),
            context: node.data.context.clone(),
            level: node.level(),
            breadcrumbs,
            children,
            siblings: self.sibling_group(node),
        })
    }

    fn lookup(&self, id: &str) -> DomainResult<&'a HierarchyNode> {
        self.tree
            .get(id)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))
    }
}
