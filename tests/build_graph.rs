use assetpipe::dag::{BuildGraph, BuildNode};
use assetpipe::types::AssetCategory;
use proptest::prelude::*;

#[test]
fn full_build_cleans_first_then_runs_categories_together() {
    let graph = BuildGraph::full(&AssetCategory::ALL);
    let stages = graph.stages().unwrap();

    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0], vec![BuildNode::Clean]);
    assert_eq!(
        stages[1],
        AssetCategory::ALL
            .iter()
            .map(|c| BuildNode::Category(*c))
            .collect::<Vec<_>>()
    );
}

#[test]
fn categories_depend_only_on_clean() {
    let graph = BuildGraph::full(&[AssetCategory::Styles, AssetCategory::Scripts]);

    assert!(graph.dependencies_of(BuildNode::Clean).is_empty());
    assert_eq!(
        graph.dependencies_of(BuildNode::Category(AssetCategory::Styles)),
        vec![BuildNode::Clean]
    );
    assert_eq!(graph.nodes().len(), 3);
}

#[test]
fn single_category_has_no_clean() {
    let graph = BuildGraph::single(AssetCategory::Fonts);
    assert_eq!(
        graph.stages().unwrap(),
        vec![vec![BuildNode::Category(AssetCategory::Fonts)]]
    );
}

#[test]
fn clean_only_graph() {
    assert_eq!(
        BuildGraph::clean_only().stages().unwrap(),
        vec![vec![BuildNode::Clean]]
    );
}

#[test]
fn full_build_with_nothing_enabled_still_cleans() {
    let stages = BuildGraph::full(&[]).stages().unwrap();
    assert_eq!(stages, vec![vec![BuildNode::Clean]]);
}

#[test]
fn nodes_display_as_command_names() {
    assert_eq!(BuildNode::Clean.to_string(), "clean");
    assert_eq!(
        BuildNode::Category(AssetCategory::VectorSprite).to_string(),
        "svgsprite"
    );
}

fn category_subset() -> impl Strategy<Value = Vec<AssetCategory>> {
    proptest::sample::subsequence(AssetCategory::ALL.to_vec(), 0..=AssetCategory::ALL.len())
}

proptest! {
    #[test]
    fn every_node_runs_after_its_dependencies(categories in category_subset()) {
        let graph = BuildGraph::full(&categories);
        let stages = graph.stages().unwrap();

        let stage_of = |node: BuildNode| stages.iter().position(|s| s.contains(&node)).unwrap();
        for node in graph.nodes() {
            for dep in graph.dependencies_of(node) {
                prop_assert!(stage_of(dep) < stage_of(node));
            }
        }

        let scheduled: usize = stages.iter().map(Vec::len).sum();
        prop_assert_eq!(scheduled, categories.len() + 1);
    }
}
