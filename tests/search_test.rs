//! Tests for SearchIndex

use rstest::{fixture, rstest};

use kbgraph::domain::{HierarchyBuilder, HierarchyTree, MatchedField, RawEntry, SearchIndex};

#[fixture]
fn tree() -> HierarchyTree {
    HierarchyBuilder::new()
        .build(vec![
            RawEntry::new(["finance"]).with_title("Finance"),
            RawEntry::new(["finance", "invest"])
                .with_title("Investing")
                .with_context("Index funds and bonds"),
            RawEntry::new(["finance", "invest", "stocks"]).with_title("Stocks"),
            RawEntry::new(["body"])
                .with_title("Body")
                .with_context("Investment in health"),
        ])
        .expect("build tree")
}

#[rstest]
#[case("")]
#[case("   ")]
fn given_blank_query_when_searching_then_empty(tree: HierarchyTree, #[case] query: &str) {
    let index = SearchIndex::build(&tree).unwrap();
    assert!(index.query(query).is_empty());
}

#[rstest]
fn given_index_when_built_then_one_record_per_node(tree: HierarchyTree) {
    let index = SearchIndex::build(&tree).unwrap();
    assert_eq!(index.len(), tree.len());
}

#[rstest]
fn given_query_when_searching_then_tiers_ordered(tree: HierarchyTree) {
    let index = SearchIndex::build(&tree).unwrap();

    let hits = index.query("INVEST");
    let found: Vec<(&str, MatchedField)> = hits
        .iter()
        .map(|h| (h.node.id(), h.matched_field))
        .collect();

    assert_eq!(
        found,
        vec![
            ("finance_invest", MatchedField::Id),
            ("finance_invest_stocks", MatchedField::Id),
            ("body", MatchedField::Context),
        ]
    );
}

#[rstest]
fn given_exact_id_when_searching_then_exact_match_first(tree: HierarchyTree) {
    let index = SearchIndex::build(&tree).unwrap();

    let hits = index.query("finance");
    assert_eq!(hits[0].node.id(), "finance");
    assert_eq!(hits.len(), 3);
}

#[rstest]
fn given_hit_when_searching_then_full_path_joins_titles(tree: HierarchyTree) {
    let index = SearchIndex::build(&tree).unwrap();

    let hits = index.query("stocks");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].full_path, "Home > Finance > Investing > Stocks");
}

#[rstest]
fn given_title_only_match_when_searching_then_matched_field_is_title(tree: HierarchyTree) {
    let index = SearchIndex::build(&tree).unwrap();

    let hits = index.query("investing");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].node.id(), "finance_invest");
    assert_eq!(hits[0].matched_field, MatchedField::Title);
}
