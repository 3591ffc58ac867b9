// src/dag/graph.rs

use std::collections::BTreeMap;
use std::fmt;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{PipelineError, Result};
use crate::types::AssetCategory;

/// A unit of work in a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildNode {
    /// Remove the destination tree.
    Clean,
    Category(AssetCategory),
}

impl fmt::Display for BuildNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildNode::Clean => f.write_str("clean"),
            BuildNode::Category(category) => write!(f, "{category}"),
        }
    }
}

/// Ordering constraints between build nodes.
///
/// Edge direction: prerequisite -> dependent. A full build is
/// `Clean -> {every enabled category}`; the categories have no edges between
/// them and run concurrently.
#[derive(Debug, Clone)]
pub struct BuildGraph {
    graph: DiGraphMap<BuildNode, ()>,
}

impl BuildGraph {
    /// Clean, then every category in parallel.
    pub fn full(categories: &[AssetCategory]) -> Self {
        let mut graph = DiGraphMap::new();
        graph.add_node(BuildNode::Clean);
        for &category in categories {
            graph.add_edge(BuildNode::Clean, BuildNode::Category(category), ());
        }
        Self { graph }
    }

    /// One category on its own, without Clean.
    pub fn single(category: AssetCategory) -> Self {
        let mut graph = DiGraphMap::new();
        graph.add_node(BuildNode::Category(category));
        Self { graph }
    }

    pub fn clean_only() -> Self {
        let mut graph = DiGraphMap::new();
        graph.add_node(BuildNode::Clean);
        Self { graph }
    }

    pub fn nodes(&self) -> Vec<BuildNode> {
        let mut nodes: Vec<BuildNode> = self.graph.nodes().collect();
        nodes.sort();
        nodes
    }

    /// Immediate prerequisites of `node`.
    pub fn dependencies_of(&self, node: BuildNode) -> Vec<BuildNode> {
        let mut deps: Vec<BuildNode> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        deps.sort();
        deps
    }

    /// Nodes grouped by longest-path depth; every node's prerequisites sit in
    /// an earlier stage. Nodes within a stage are sorted.
    pub fn stages(&self) -> Result<Vec<Vec<BuildNode>>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            PipelineError::ConfigError(format!(
                "cycle detected in build graph involving '{}'",
                cycle.node_id()
            ))
        })?;

        let mut depth: BTreeMap<BuildNode, usize> = BTreeMap::new();
        for node in order {
            let d = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .filter_map(|dep| depth.get(&dep).map(|d| d + 1))
                .max()
                .unwrap_or(0);
            depth.insert(node, d);
        }

        let mut stages: Vec<Vec<BuildNode>> = Vec::new();
        for (node, d) in depth {
            if stages.len() <= d {
                stages.resize_with(d + 1, Vec::new);
            }
            stages[d].push(node);
        }
        for stage in &mut stages {
            stage.sort();
        }
        Ok(stages)
    }
}
