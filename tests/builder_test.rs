//! Tests for HierarchyBuilder

use std::collections::HashSet;

use rstest::rstest;

use kbgraph::domain::{BuildOptions, DomainError, HierarchyBuilder, HierarchyTree, RawEntry};
use kbgraph::util::testing;

fn finance_entries() -> Vec<RawEntry> {
    vec![
        RawEntry::new(["finance"]).with_title("Finance"),
        RawEntry::new(["finance", "invest"]).with_title("Invest"),
        RawEntry::new(["finance", "invest", "stocks"]).with_title("Stocks"),
    ]
}

fn build(entries: Vec<RawEntry>) -> HierarchyTree {
    HierarchyBuilder::new().build(entries).expect("build tree")
}

fn child_ids(tree: &HierarchyTree, id: &str) -> Vec<String> {
    let node = tree.get(id).expect("node exists");
    node.children
        .iter()
        .filter_map(|&idx| tree.get_node(idx))
        .map(|child| child.id().to_string())
        .collect()
}

#[test]
fn given_finance_chain_when_building_then_levels_follow_depth() {
    testing::init_test_setup();
    let tree = build(finance_entries());

    assert_eq!(tree.len(), 4);
    assert_eq!(child_ids(&tree, "index"), vec!["finance"]);
    assert_eq!(child_ids(&tree, "finance"), vec!["finance_invest"]);
    assert_eq!(child_ids(&tree, "finance_invest"), vec!["finance_invest_stocks"]);
    assert_eq!(tree.get("finance").unwrap().level(), 1);
    assert_eq!(tree.get("finance_invest").unwrap().level(), 2);
    assert_eq!(tree.get("finance_invest_stocks").unwrap().level(), 3);
}

#[test]
fn given_entries_in_any_order_when_building_then_same_tree() {
    let mut reversed = finance_entries();
    reversed.reverse();

    let a = build(finance_entries());
    let b = build(reversed);

    let ids_a: Vec<_> = a.iter().map(|(_, n)| n.id().to_string()).collect();
    let ids_b: Vec<_> = b.iter().map(|(_, n)| n.id().to_string()).collect();
    assert_eq!(ids_a, ids_b);
}

#[test]
fn given_every_tree_when_built_then_ids_unique_and_levels_consistent() {
    let tree = build(vec![
        RawEntry::new(["a", "b", "c"]),
        RawEntry::new(["a", "d"]),
        RawEntry::new(["e"]),
    ]);

    let ids: HashSet<_> = tree.iter().map(|(_, n)| n.id()).collect();
    assert_eq!(ids.len(), tree.len());

    for (_, node) in tree.iter() {
        match node.parent.and_then(|p| tree.get_node(p)) {
            Some(parent) => {
                assert_eq!(node.level(), parent.level() + 1);
                assert!(parent.children.iter().any(|&c| tree.get_node(c).map(|n| n.id()) == Some(node.id())));
            }
            None => assert!(node.is_root()),
        }
    }
}

#[test]
fn given_two_entries_with_same_path_when_building_then_duplicate_id_names_both_sources() {
    let result = HierarchyBuilder::new().build(vec![
        RawEntry::new(["body", "habit"]).with_origin("Body/Habit.md"),
        RawEntry::new(["body", "habit"]).with_origin("body/habit.md"),
    ]);

    match result {
        Err(DomainError::DuplicateId { id, first, second }) => {
            assert_eq!(id, "body_habit");
            assert_eq!(first, "Body/Habit.md");
            assert_eq!(second, "body/habit.md");
        }
        other => panic!("expected DuplicateId, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn given_missing_intermediate_when_building_then_placeholder_synthesized() {
    let tree = build(vec![RawEntry::new(["level", "work", "project"]).with_title("Project")]);

    let work = tree.get("level_work").expect("placeholder exists");
    assert!(work.data.placeholder);
    assert_eq!(work.title(), "Work");
    assert_eq!(work.context(), None);
    assert_eq!(child_ids(&tree, "level_work"), vec!["level_work_project"]);
}

#[test]
fn given_deeper_entry_listed_first_when_building_then_shallow_entry_is_real_node() {
    let tree = build(vec![
        RawEntry::new(["level", "work", "project"]),
        RawEntry::new(["level", "work"]).with_title("Day Job").with_context("Employment"),
    ]);

    let work = tree.get("level_work").unwrap();
    assert!(!work.data.placeholder);
    assert_eq!(work.title(), "Day Job");
    assert_eq!(work.context(), Some("Employment"));
    assert_eq!(tree.len(), 4);
}

#[rstest]
#[case(vec![RawEntry::new(["index"]), RawEntry::new(["other"])], "<placeholder>")]
#[case(vec![RawEntry::new(["index", "notes"])], "<placeholder>")]
#[case(vec![RawEntry::new(Vec::<String>::new()), RawEntry::new(["index"])], "<root>")]
#[case(vec![RawEntry::new(Vec::<String>::new()), RawEntry::new(["index", "notes"])], "<root>")]
fn given_component_equal_to_root_id_when_building_then_duplicate_id(
    #[case] entries: Vec<RawEntry>,
    #[case] first_source: &str,
) {
    let result = HierarchyBuilder::new().build(entries);

    match result {
        Err(DomainError::DuplicateId { id, first, .. }) => {
            assert_eq!(id, "index");
            assert_eq!(first, first_source);
        }
        other => panic!("expected DuplicateId, got {:?}", other.map(|t| t.len())),
    }
}

#[test]
fn given_no_entries_when_building_then_empty_source() {
    let result = HierarchyBuilder::new().build(vec![]);
    assert!(matches!(result, Err(DomainError::EmptySource)));
}

#[rstest]
#[case(vec!["body_habit"])]
#[case(vec!["body", ""])]
fn given_invalid_component_when_building_then_malformed(#[case] components: Vec<&str>) {
    let result = HierarchyBuilder::new().build(vec![RawEntry::new(components)]);
    assert!(matches!(result, Err(DomainError::MalformedSource { .. })));
}

#[test]
fn given_order_fields_when_building_then_order_wins_over_encounter() {
    let tree = build(vec![
        RawEntry::new(["alpha"]),
        RawEntry::new(["beta"]).with_order(2),
        RawEntry::new(["gamma"]).with_order(1),
    ]);
    assert_eq!(child_ids(&tree, "index"), vec!["gamma", "beta", "alpha"]);
}

#[test]
fn given_explicit_children_when_building_then_declared_order_kept() {
    let tree = build(vec![
        RawEntry::new(Vec::<String>::new()).with_explicit_children(["zeta", "alpha"]),
        RawEntry::new(["alpha"]),
        RawEntry::new(["zeta"]),
    ]);
    assert_eq!(child_ids(&tree, "index"), vec!["zeta", "alpha"]);
}

#[test]
fn given_custom_options_when_building_then_root_and_artifacts_follow() {
    let options = BuildOptions {
        root_id: "home".into(),
        root_title: "Knowledge".into(),
        artifact_extension: "htm".into(),
    };
    let tree = HierarchyBuilder::with_options(options)
        .build(vec![RawEntry::new(["finance"])])
        .unwrap();

    let root = tree.root_node().unwrap();
    assert_eq!(root.id(), "home");
    assert_eq!(root.title(), "Knowledge");
    assert_eq!(tree.artifact_for("finance").unwrap().as_str(), "finance.htm");
}

#[test]
fn given_same_builder_when_building_twice_then_identical_results() {
    let mut builder = HierarchyBuilder::new();
    let first = builder.build(finance_entries()).unwrap();
    let second = builder.build(finance_entries()).unwrap();

    let dump = |t: &HierarchyTree| -> Vec<(String, usize, String)> {
        t.iter()
            .map(|(_, n)| (n.id().to_string(), n.level(), n.artifact_ref().to_string()))
            .collect()
    };
    assert_eq!(dump(&first), dump(&second));
}

#[test]
fn given_omitted_title_when_building_then_humanized_component() {
    let tree = build(vec![RawEntry::new(["side-projects"])]);
    assert_eq!(tree.get("side-projects").unwrap().title(), "Side Projects");
}
