//! Case-insensitive substring search over a built hierarchy.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::arena::{HierarchyNode, HierarchyTree};
use crate::domain::error::DomainResult;
use crate::domain::links::LinkResolver;

/// Separator between titles in a hit's full path.
pub const PATH_SEPARATOR: &str = " > ";

/// Field a query matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Id,
    Title,
    Context,
}

impl fmt::Display for MatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchedField::Id => "id",
            MatchedField::Title => "title",
            MatchedField::Context => "context",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SearchHit<'a> {
    pub node: &'a HierarchyNode,
    pub matched_field: MatchedField,
    /// Breadcrumb titles joined with [`PATH_SEPARATOR`]
    pub full_path: String,
}

#[derive(Debug)]
struct IndexRecord<'a> {
    node: &'a HierarchyNode,
    id: String,
    title: String,
    context: String,
    full_path: String,
}

/// Read-only index, one record per reachable node in pre-order.
#[derive(Debug)]
pub struct SearchIndex<'a> {
    records: Vec<IndexRecord<'a>>,
}

impl<'a> SearchIndex<'a> {
    #[instrument(level = "debug", skip(tree))]
    pub fn build(tree: &'a HierarchyTree) -> DomainResult<Self> {
        let resolver = LinkResolver::new(tree);
        let mut records = Vec::with_capacity(tree.len());

        for (_, node) in tree.iter() {
            let full_path = resolver
                .breadcrumbs(node)?
                .iter()
                .map(|n| n.title())
                .join(PATH_SEPARATOR);
            records.push(IndexRecord {
                node,
                id: node.id().to_lowercase(),
                title: node.title().to_lowercase(),
                context: node.context().unwrap_or_default().to_lowercase(),
                full_path,
            });
        }

        debug!("indexed {} nodes", records.len());
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tiers: exact id, id substring, title, context. Pre-order within a tier.
    /// A blank query matches nothing; otherwise whitespace is part of the needle.
    pub fn query(&self, text: &str) -> Vec<SearchHit<'a>> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let needle = text.to_lowercase();

        let mut hits: Vec<(u8, SearchHit<'a>)> = self
            .records
            .iter()
            .filter_map(|record| {
                let (tier, matched_field) = if record.id == needle {
                    (0, MatchedField::Id)
                } else if record.id.contains(&needle) {
                    (1, MatchedField::Id)
                } else if record.title.contains(&needle) {
                    (2, MatchedField::Title)
                } else if record.context.contains(&needle) {
                    (3, MatchedField::Context)
                } else {
                    return None;
                };
                Some((
                    tier,
                    SearchHit {
                        node: record.node,
                        matched_field,
                        full_path: record.full_path.clone(),
                    },
                ))
            })
            .collect();

        hits.sort_by_key(|(tier, _)| *tier);
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}
