//! Tests for SourceLoader

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use kbgraph::application::services::{LoaderOptions, SourceKind, SourceLoader};
use kbgraph::application::ApplicationError;
use kbgraph::domain::{DomainError, HierarchyBuilder};
use kbgraph::infrastructure::traits::RealFileSystem;
use kbgraph::util::testing;

/// Helper to create a file (and its parent directories) below `root`
fn create_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).expect("create parent dirs");
    std::fs::write(&path, content).expect("write file");
    path
}

fn loader() -> SourceLoader {
    SourceLoader::new(Arc::new(RealFileSystem), LoaderOptions::default())
}

fn components(outcome: &kbgraph::application::services::LoadOutcome) -> Vec<String> {
    outcome
        .entries
        .iter()
        .map(|e| e.path_components.join("/"))
        .collect()
}

#[test]
fn given_markdown_tree_when_loading_then_one_entry_per_file() {
    testing::init_test_setup();
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "main.md", "---\ntitle: Knowledge\n---\nWelcome.\n");
    create_file(temp.path(), "Finance.md", "# Finance\n\nMoney matters.\n");
    create_file(temp.path(), "Finance/Invest.md", "---\norder: 1\n---\n");
    create_file(temp.path(), "Finance/Invest/Stocks.md", "Equities\n");
    create_file(temp.path(), "notes.txt", "ignored");
    create_file(temp.path(), ".git/hidden.md", "ignored");

    let outcome = loader().load(temp.path()).unwrap();

    let mut found = components(&outcome);
    found.sort();
    assert_eq!(
        found,
        vec!["", "finance", "finance/invest", "finance/invest/stocks"]
    );
    assert!(outcome.warnings.is_empty());

    let root = outcome
        .entries
        .iter()
        .find(|e| e.path_components.is_empty())
        .unwrap();
    assert_eq!(root.title.as_deref(), Some("Knowledge"));
    assert_eq!(root.context.as_deref(), Some("Welcome."));

    let finance = outcome
        .entries
        .iter()
        .find(|e| e.path_components == vec!["finance"])
        .unwrap();
    assert_eq!(finance.context.as_deref(), Some("Money matters."));
    assert_eq!(finance.origin, "Finance.md");

    let invest = outcome
        .entries
        .iter()
        .find(|e| e.path_components == vec!["finance", "invest"])
        .unwrap();
    assert_eq!(invest.order, Some(1));
}

#[test]
fn given_spaces_in_names_when_loading_then_components_normalized() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "Side Projects/Home  Lab.md", "");

    let outcome = loader().load(temp.path()).unwrap();
    assert_eq!(components(&outcome), vec!["side-projects/home-lab"]);
}

#[test]
fn given_broken_files_when_loading_then_skipped_with_warnings() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "good.md", "fine");
    create_file(temp.path(), "broken.md", "---\ntitle: [unclosed\n---\n");
    std::fs::write(temp.path().join("binary.md"), [0xff, 0xfe, 0x00]).unwrap();

    let outcome = loader().load(temp.path()).unwrap();

    assert_eq!(components(&outcome), vec!["good"]);
    assert_eq!(outcome.warnings.len(), 2);
    let origins: Vec<&str> = outcome.warnings.iter().map(|w| w.origin.as_str()).collect();
    assert!(origins.contains(&"broken.md"));
    assert!(origins.contains(&"binary.md"));
}

#[test]
fn given_custom_root_name_when_loading_then_that_file_is_root() {
    let temp = TempDir::new().unwrap();
    create_file(temp.path(), "index.md", "root");
    create_file(temp.path(), "main.md", "not root");

    let options = LoaderOptions {
        root_name: "index".into(),
        ..LoaderOptions::default()
    };
    let outcome = SourceLoader::new(Arc::new(RealFileSystem), options)
        .load(temp.path())
        .unwrap();

    let mut found = components(&outcome);
    found.sort();
    assert_eq!(found, vec!["", "main"]);
}

#[test]
fn given_missing_path_when_loading_then_source_not_found() {
    let temp = TempDir::new().unwrap();
    let result = loader().load(&temp.path().join("absent"));
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::SourceNotFound(_)))
    ));
}

#[test]
fn given_plain_file_when_detecting_then_unsupported() {
    let temp = TempDir::new().unwrap();
    let path = create_file(temp.path(), "notes.txt", "x");
    let result = loader().detect(&path);
    assert!(matches!(result, Err(ApplicationError::UnsupportedSource(_))));
}

#[test]
fn given_yaml_file_when_loading_then_yaml_mode() {
    let temp = TempDir::new().unwrap();
    let path = create_file(
        temp.path(),
        "kb.yml",
        r#"
metadata:
  title: Knowledge
  description: Everything
structure:
  - key: Finance
    order: 2
    children:
      - id: finance_invest
        title: Invest
  - key: Body
    order: 1
"#,
    );

    assert_eq!(loader().detect(&path).unwrap(), SourceKind::Yaml);
    let outcome = loader().load(&path).unwrap();

    assert_eq!(components(&outcome), vec!["", "finance", "finance/invest", "body"]);
    assert_eq!(outcome.entries[0].context.as_deref(), Some("Everything"));
    assert_eq!(outcome.entries[3].order, Some(1));
}

#[test]
fn given_invalid_yaml_when_loading_then_malformed() {
    let temp = TempDir::new().unwrap();
    let path = create_file(temp.path(), "kb.yaml", "structure: [unclosed\n");

    let result = loader().load(&path);
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MalformedSource { .. }))
    ));
}

#[rstest]
#[case("../escaped")]
#[case("nested/key")]
#[case("back\\slash")]
#[case("..")]
#[case(".")]
fn given_yaml_key_with_path_segments_when_building_then_malformed(#[case] key: &str) {
    let temp = TempDir::new().unwrap();
    let path = create_file(
        temp.path(),
        "kb.yaml",
        &format!("structure:\n  '{}':\n    title: X\n", key),
    );

    let outcome = loader().load(&path).unwrap();
    assert_eq!(outcome.entries[1].path_components, vec![key.to_string()]);

    let result = HierarchyBuilder::new().build(outcome.entries);
    assert!(
        matches!(result, Err(DomainError::MalformedSource { .. })),
        "key {:?} accepted",
        key
    );
}
