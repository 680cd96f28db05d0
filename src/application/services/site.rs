//! Site generation service
//!
//! Orchestrates load → build → render → write, plus the read-only reports
//! (search, summary, validation) the CLI offers on a loaded tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::error_ext::IoResultExt;
use crate::application::render::PageRenderer;
use crate::application::services::loader::{LoadWarning, SourceLoader};
use crate::application::ApplicationResult;
use crate::domain::{
    BuildOptions, DomainError, HierarchyBuilder, HierarchyNode, HierarchyTree, LinkResolver,
    SearchHit, SearchIndex,
};
use crate::infrastructure::traits::FileSystem;

/// A built tree together with the loading warnings.
#[derive(Debug)]
pub struct LoadedTree {
    pub tree: HierarchyTree,
    pub warnings: Vec<LoadWarning>,
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Written documents, in pre-order
    pub written: Vec<PathBuf>,
    pub warnings: Vec<LoadWarning>,
}

/// Structural statistics of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub per_level: BTreeMap<usize, usize>,
    pub depth: usize,
    pub placeholders: usize,
    pub leaves: usize,
}

pub struct SiteService {
    fs: Arc<dyn FileSystem>,
    loader: SourceLoader,
    build_options: BuildOptions,
    renderer: Box<dyn PageRenderer>,
}

impl SiteService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        loader: SourceLoader,
        build_options: BuildOptions,
        renderer: Box<dyn PageRenderer>,
    ) -> Self {
        Self {
            fs,
            loader,
            build_options,
            renderer,
        }
    }

    /// Load the source and build the hierarchy.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, source: &Path) -> ApplicationResult<LoadedTree> {
        let outcome = self.loader.load(source)?;
        let mut builder = HierarchyBuilder::with_options(self.build_options.clone());
        let tree = builder.build(outcome.entries)?;
        debug!("load_tree: {} nodes", tree.len());
        Ok(LoadedTree {
            tree,
            warnings: outcome.warnings,
        })
    }

    /// Render every node into `out_dir/<artifact_ref>`.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(&self, source: &Path, out_dir: &Path) -> ApplicationResult<GenerateReport> {
        let LoadedTree { tree, warnings } = self.load_tree(source)?;
        self.prepare_out_dir(out_dir)?;

        let resolver = LinkResolver::new(&tree);
        let mut written = Vec::with_capacity(tree.len());
        for (_, node) in tree.iter() {
            written.push(self.write_page(&resolver, node, out_dir)?);
        }

        info!(
            "generated {} pages into {}",
            written.len(),
            out_dir.display()
        );
        Ok(GenerateReport { written, warnings })
    }

    /// Regenerate the page of a single node; other pages are left alone.
    #[instrument(level = "debug", skip(self))]
    pub fn generate_item(
        &self,
        source: &Path,
        out_dir: &Path,
        id: &str,
    ) -> ApplicationResult<GenerateReport> {
        let LoadedTree { tree, warnings } = self.load_tree(source)?;
        let node = tree
            .get(id)
            .ok_or_else(|| DomainError::UnknownNode(id.to_string()))?;
        self.prepare_out_dir(out_dir)?;

        let resolver = LinkResolver::new(&tree);
        let target = self.write_page(&resolver, node, out_dir)?;
        info!("regenerated {}", target.display());
        Ok(GenerateReport {
            written: vec![target],
            warnings,
        })
    }

    fn prepare_out_dir(&self, out_dir: &Path) -> ApplicationResult<()> {
        self.fs
            .create_dir_all(out_dir)
            .with_path_context("create output directory", out_dir)
    }

    fn write_page<'t>(
        &self,
        resolver: &LinkResolver<'t>,
        node: &'t HierarchyNode,
        out_dir: &Path,
    ) -> ApplicationResult<PathBuf> {
        let view = resolver.page_view(node)?;
        let document = self.renderer.render(&view);
        let target = out_dir.join(node.artifact_ref().as_str());
        self.fs
            .write(&target, &document)
            .with_path_context("write page", &target)?;
        debug!("wrote {}", target.display());
        Ok(target)
    }

    pub fn search<'a>(
        &self,
        tree: &'a HierarchyTree,
        query: &str,
    ) -> ApplicationResult<Vec<SearchHit<'a>>> {
        let index = SearchIndex::build(tree)?;
        Ok(index.query(query))
    }

    pub fn summary(&self, tree: &HierarchyTree) -> Summary {
        Summary {
            total: tree.len(),
            per_level: tree.level_counts(),
            depth: tree.depth(),
            placeholders: tree.iter().filter(|(_, n)| n.data.placeholder).count(),
            leaves: tree.leaf_nodes().len(),
        }
    }

    /// Non-fatal structural issues, in pre-order.
    pub fn validate(&self, tree: &HierarchyTree) -> Vec<String> {
        let mut issues = Vec::new();
        for (_, node) in tree.iter() {
            if node.data.placeholder {
                issues.push(format!("{}: placeholder without own source", node.id()));
            } else if node.context().is_none() {
                issues.push(format!("{}: no context", node.id()));
            }
        }
        issues
    }
}
