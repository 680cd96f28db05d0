/*
Terminal rendering of a hierarchy via termtree.

Defined as a trait so the display concern stays out of the domain types.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::{HierarchyNode, HierarchyTree};

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

fn label(node: &HierarchyNode) -> String {
    if node.data.placeholder {
        format!("{} ({}) *", node.title(), node.id())
    } else {
        format!("{} ({})", node.title(), node.id())
    }
}

impl TreeDisplay for HierarchyTree {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &HierarchyTree, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = tree.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = tree.get_node(child_idx) {
                        let mut child_tree = Tree::new(label(child));
                        build_tree(tree, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.root().and_then(|idx| self.get_node(idx).map(|node| (idx, node))) {
            Some((root_idx, root)) => {
                let mut tree = Tree::new(label(root));
                build_tree(self, root_idx, &mut tree);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HierarchyBuilder, RawEntry};

    #[test]
    fn given_tree_when_displaying_then_nested_labels() {
        let tree = HierarchyBuilder::new()
            .build(vec![RawEntry::new(["finance", "invest"]).with_title("Invest")])
            .unwrap();

        let rendered = tree.to_tree_string().to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Home (index) *");
        assert!(lines[1].ends_with("Finance (finance) *"));
        assert!(lines[2].ends_with("Invest (finance_invest)"));
    }

    #[test]
    fn given_empty_tree_when_displaying_then_placeholder_text() {
        let tree = HierarchyTree::default();
        assert_eq!(tree.to_tree_string().to_string().trim(), "Empty tree");
    }
}
