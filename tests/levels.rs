// tests/levels.rs

mod common;
use crate::common::builders::{diamond, straight_line};
use crate::common::{GraphBuilder, init_tracing, level_of};

use mindchain::graph::GraphIndex;
use mindchain::graph::levels::compute_levels;

#[test]
fn straight_sequence_keeps_one_level() {
    init_tracing();
    let graph = straight_line().build();

    assert_eq!(level_of(&graph, 0), 0);
    for id in [1, 2, 3] {
        assert_eq!(level_of(&graph, id), 1, "node {id}");
    }
}

#[test]
fn divergence_increments_and_convergence_takes_agreed_level() {
    init_tracing();
    let graph = diamond().build();

    assert_eq!(level_of(&graph, 1), 1);
    assert_eq!(level_of(&graph, 2), 2);
    assert_eq!(level_of(&graph, 3), 2);
    assert_eq!(level_of(&graph, 4), 2);
}

#[test]
fn every_top_level_task_is_level_one() {
    let graph = GraphBuilder::new("two goals")
        .edge(0, 1)
        .edge(0, 2)
        .edge(2, 3)
        .build();

    assert_eq!(level_of(&graph, 1), 1);
    assert_eq!(level_of(&graph, 2), 1);
    assert_eq!(level_of(&graph, 3), 1);
}

#[test]
fn nested_divergence_goes_one_deeper_per_split() {
    let graph = GraphBuilder::new("nested")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(2, 4)
        .edge(2, 5)
        .build();

    assert_eq!(level_of(&graph, 2), 2);
    assert_eq!(level_of(&graph, 3), 2);
    assert_eq!(level_of(&graph, 4), 3);
    assert_eq!(level_of(&graph, 5), 3);
}

#[test]
fn disagreeing_predecessors_resolve_to_minimum() {
    init_tracing();
    // 6 is reached both directly from the split at 1 (proposes 2) and from
    // deep inside 2's own split (3 proposes 3).
    let raw = GraphBuilder::new("skewed")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 6)
        .edge(2, 3)
        .edge(2, 4)
        .edge(3, 6)
        .build_raw();

    let index = GraphIndex::build(&raw);
    let order = index.topo_order().expect("acyclic");
    let levels = compute_levels(&raw, &index, &order);

    assert_eq!(levels[&3], 3);
    assert_eq!(levels[&6], 2);
}

#[test]
fn levels_never_decrease_along_agreeing_edges() {
    let graph = GraphBuilder::new("mixed")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(2, 4)
        .edge(3, 4)
        .edge(4, 5)
        .edge(0, 6)
        .build();
    let index = GraphIndex::build(&graph);

    for edge in graph.edges().iter().filter(|e| e.source != 0) {
        let (s, t) = (level_of(&graph, edge.source), level_of(&graph, edge.target));
        assert!(t >= s, "edge {edge:?} goes up: {s} -> {t}");
        assert_eq!(
            t == s,
            index.out_degree(edge.source) == 1,
            "edge {edge:?}: equality must match a non-diverging source"
        );
    }
}
