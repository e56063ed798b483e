#![allow(dead_code)]

pub use mindchain_test_utils::builders;
pub use mindchain_test_utils::{GraphBuilder, RecordingStore, init_tracing, t0, with_timeout};

use mindchain::graph::MindGraph;
use mindchain::types::{NodeId, Reason, ReasonSet, Status};

pub fn reasons_of(graph: &MindGraph, id: NodeId) -> ReasonSet {
    graph
        .node(id)
        .unwrap_or_else(|| panic!("node {id} missing"))
        .reasons
        .clone()
}

pub fn status_of(graph: &MindGraph, id: NodeId) -> Status {
    graph
        .node(id)
        .unwrap_or_else(|| panic!("node {id} missing"))
        .status
}

pub fn level_of(graph: &MindGraph, id: NodeId) -> u32 {
    graph
        .node(id)
        .unwrap_or_else(|| panic!("node {id} missing"))
        .level
}

pub fn set(reasons: &[Reason]) -> ReasonSet {
    reasons.iter().copied().collect()
}

pub fn edge_pairs(graph: &MindGraph) -> Vec<(NodeId, NodeId)> {
    graph.edges().iter().map(|e| (e.source, e.target)).collect()
}
