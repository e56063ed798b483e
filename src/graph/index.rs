// src/graph/index.rs

//! Adjacency index rebuilt from the edge list on every pass, plus
//! structural validation.

use std::collections::BTreeSet;

use petgraph::Direction;
use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;

use crate::errors::{MindChainError, Result};
use crate::graph::model::MindGraph;
use crate::types::{NodeId, ROOT_ID};

/// Read-only adjacency view over a [`MindGraph`].
///
/// Neighbour lists keep edge insertion order, which makes every traversal
/// built on top of the index deterministic.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    graph: DiGraphMap<NodeId, ()>,
}

impl GraphIndex {
    /// Build the index. Edges pointing at unknown ids are skipped here;
    /// [`validate`] reports them.
    pub fn build(graph: &MindGraph) -> Self {
        let mut index: DiGraphMap<NodeId, ()> = DiGraphMap::new();

        for node in graph.nodes() {
            index.add_node(node.id);
        }
        for edge in graph.edges() {
            if graph.contains(edge.source) && graph.contains(edge.target) {
                index.add_edge(edge.source, edge.target, ());
            }
        }

        Self { graph: index }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.graph.contains_node(id)
    }

    /// Targets of outgoing edges.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        if !self.graph.contains_node(id) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect()
    }

    /// Sources of incoming edges.
    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        if !self.graph.contains_node(id) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .collect()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.successors(id).len()
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        self.predecessors(id).len()
    }

    /// Successors one level deeper: the sub-tasks of a diverging node.
    ///
    /// A same-level successor is the next step of the branch, not a child.
    pub fn direct_children(&self, graph: &MindGraph, id: NodeId) -> Vec<NodeId> {
        let level = graph.level_of(id);
        self.successors(id)
            .into_iter()
            .filter(|c| graph.level_of(*c) == level + 1)
            .collect()
    }

    /// Predecessors one level shallower.
    pub fn direct_parents(&self, graph: &MindGraph, id: NodeId) -> Vec<NodeId> {
        let level = graph.level_of(id);
        self.predecessors(id)
            .into_iter()
            .filter(|p| graph.level_of(*p) + 1 == level)
            .collect()
    }

    /// Topological order starting at the root.
    pub fn topo_order(&self) -> Result<Vec<NodeId>> {
        toposort(&self.graph, None).map_err(|cycle| {
            MindChainError::GraphCycle(format!(
                "cycle detected in mind chain involving node {}",
                cycle.node_id()
            ))
        })
    }

    /// Every node reachable from `start`, including `start`.
    pub fn reachable_from(&self, start: NodeId) -> BTreeSet<NodeId> {
        let mut seen = BTreeSet::new();
        if !self.graph.contains_node(start) {
            return seen;
        }
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(id) = dfs.next(&self.graph) {
            seen.insert(id);
        }
        seen
    }

    /// Whether a directed path leads from `from` to `to`.
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        if !self.graph.contains_node(from) || !self.graph.contains_node(to) {
            return false;
        }
        has_path_connecting(&self.graph, from, to, None)
    }

    /// Sink nodes reachable from `start` (`start` itself if it is a sink),
    /// in depth-first discovery order.
    pub fn leaves_under(&self, start: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        if !self.graph.contains_node(start) {
            return leaves;
        }
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(id) = dfs.next(&self.graph) {
            if self.out_degree(id) == 0 {
                leaves.push(id);
            }
        }
        leaves
    }
}

/// Check the structural invariants of a graph:
///
/// - the root exists,
/// - every edge references known nodes,
/// - there are no cycles,
/// - every node is reachable from the root.
pub fn validate(graph: &MindGraph) -> Result<()> {
    if !graph.contains(ROOT_ID) {
        return Err(MindChainError::InvalidReference(ROOT_ID));
    }

    for edge in graph.edges() {
        for id in [edge.source, edge.target] {
            if !graph.contains(id) {
                return Err(MindChainError::InvalidReference(id));
            }
        }
    }

    let index = GraphIndex::build(graph);
    index.topo_order()?;

    let reachable = index.reachable_from(ROOT_ID);
    if let Some(orphan) = graph.nodes().map(|n| n.id).find(|id| !reachable.contains(id)) {
        return Err(MindChainError::DisconnectedNode(orphan));
    }

    Ok(())
}
