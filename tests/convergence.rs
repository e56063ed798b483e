// tests/convergence.rs

mod common;
use crate::common::builders::{diamond, straight_line};
use crate::common::{GraphBuilder, init_tracing};

use std::collections::BTreeSet;

use mindchain::graph::{GraphIndex, MindGraph, find_convergence, span_until};
use mindchain::types::NodeId;

fn convergence(graph: &MindGraph, id: NodeId) -> Option<NodeId> {
    let index = GraphIndex::build(graph);
    find_convergence(graph, &index, id)
}

fn span(graph: &MindGraph, id: NodeId, stop: Option<NodeId>) -> BTreeSet<NodeId> {
    let index = GraphIndex::build(graph);
    let order = index.topo_order().expect("acyclic");
    span_until(&index, &order, id, stop)
}

/// `root -> 1 -> {2, 3}`, `2 -> {4, 5} -> 6 -> 7`, `3 -> 7`.
fn nested_merge() -> MindGraph {
    GraphBuilder::new("nested merge")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(2, 4)
        .edge(2, 5)
        .edge(4, 6)
        .edge(5, 6)
        .edge(6, 7)
        .edge(3, 7)
        .build()
}

#[test]
fn single_continuation_is_the_convergence_point() {
    init_tracing();
    let graph = straight_line().build();

    assert_eq!(convergence(&graph, 1), Some(2));
    assert_eq!(convergence(&graph, 2), Some(3));
    assert_eq!(convergence(&graph, 3), None);
}

#[test]
fn both_diamond_branches_meet_at_the_merge() {
    let graph = diamond().build();

    assert_eq!(convergence(&graph, 2), Some(4));
    assert_eq!(convergence(&graph, 3), Some(4));
}

#[test]
fn divergence_without_a_shallower_node_below_has_no_convergence() {
    let graph = diamond().build();

    // Everything below 1 sits one level deeper, so nothing remerges at 1's level.
    assert_eq!(convergence(&graph, 1), None);
}

#[test]
fn depth_first_search_skips_deeper_merges() {
    init_tracing();
    let graph = nested_merge();

    assert_eq!(graph.node(6).map(|n| n.level), Some(3));
    assert_eq!(graph.node(7).map(|n| n.level), Some(2));

    // 6 is deeper than 2, so the walk continues until 7.
    assert_eq!(convergence(&graph, 2), Some(7));
    assert_eq!(convergence(&graph, 4), Some(6));
    assert_eq!(convergence(&graph, 3), Some(7));
}

#[test]
fn unknown_node_has_no_convergence() {
    let graph = diamond().build();
    assert_eq!(convergence(&graph, 42), None);
}

#[test]
fn span_stops_before_the_convergence_point() {
    let graph = nested_merge();

    assert_eq!(span(&graph, 2, Some(7)), BTreeSet::from([2, 4, 5, 6]));
    assert_eq!(span(&graph, 3, Some(7)), BTreeSet::from([3]));
}

#[test]
fn span_excludes_nodes_fed_from_outside() {
    let graph = nested_merge();

    // 7 is also fed by 3, so it never joins 2's span even without a stop.
    assert_eq!(span(&graph, 2, None), BTreeSet::from([2, 4, 5, 6]));
    // From 1 every node downstream is owned by the branch.
    assert_eq!(span(&graph, 1, None), BTreeSet::from([1, 2, 3, 4, 5, 6, 7]));
}

#[test]
fn span_of_unknown_node_is_empty() {
    let graph = straight_line().build();
    assert!(span(&graph, 99, None).is_empty());
}
