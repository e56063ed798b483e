// tests/ordering.rs

mod common;
use crate::common::{GraphBuilder, init_tracing, t0};

use mindchain::engine::MindChain;
use mindchain::engine::operators::{self, MIN_PRIORITY};
use mindchain::errors::MindChainError;
use mindchain::graph::ordering::compute_order;
use mindchain::graph::{GraphIndex, MindGraph, PriorityDefaults};
use mindchain::types::BlockCode;
use mindchain::types::PriorityDirection::{Down, Up};

/// `root -> 1 -> {2, 3, 4}`, three leaf sub-tasks.
fn three_children() -> GraphBuilder {
    GraphBuilder::new("three")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(1, 4)
}

fn offset(graph: &MindGraph, id: u64) -> i64 {
    graph.node(id).unwrap().offset
}

fn priority(chain: &MindChain, id: u64) -> Option<i64> {
    chain.graph().node(id).unwrap().priority
}

#[test]
fn untouched_siblings_keep_their_slots() {
    let graph = three_children().build();
    for id in [1, 2, 3, 4] {
        assert_eq!(offset(&graph, id), 0);
    }
}

#[test]
fn executable_siblings_move_ahead_of_blocked_ones() {
    init_tracing();
    let graph = three_children().event_block(2, "parts").build();

    let index = GraphIndex::build(&graph);
    let order = index.topo_order().unwrap();
    let computed = compute_order(&graph, &index, &order, &PriorityDefaults::default());

    assert_eq!(computed.groups.get(&1), Some(&vec![3, 4, 2]));
    assert_eq!(offset(&graph, 2), 2);
    assert_eq!(offset(&graph, 3), -1);
    assert_eq!(offset(&graph, 4), -1);
}

#[test]
fn higher_priority_wins_within_the_same_status() {
    let graph = three_children().priority(4, 500).build();

    assert_eq!(offset(&graph, 4), -2);
    assert_eq!(offset(&graph, 2), 1);
    assert_eq!(offset(&graph, 3), 1);
}

#[test]
fn moved_child_carries_its_whole_span() {
    let graph = GraphBuilder::new("spans")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(3, 5)
        .edge(3, 6)
        .priority(3, 200)
        .build();

    // 3 moves one slot left and takes its own sub-tasks with it.
    assert_eq!(offset(&graph, 3), -1);
    assert_eq!(offset(&graph, 5), -1);
    assert_eq!(offset(&graph, 6), -1);
    assert_eq!(offset(&graph, 2), 1);
}

#[test]
fn tie_on_move_up_steps_past_the_neighbour() {
    let mut chain = three_children().build_chain();

    let step = chain.change_priority(3, Up).unwrap();

    assert_eq!(priority(&chain, 3), Some(101));
    assert_eq!(priority(&chain, 2), None);
    assert_eq!(offset(chain.graph(), 3), -1);
    assert_eq!(offset(chain.graph(), 2), 1);
    assert!(step.relayout.contains(&3));
    assert!(step.relayout.contains(&2));
}

#[test]
fn distinct_priorities_are_swapped() {
    let mut chain = three_children().build_chain();
    chain.change_priority(3, Up).unwrap();

    chain.change_priority(3, Down).unwrap();

    assert_eq!(priority(&chain, 2), Some(101));
    assert_eq!(priority(&chain, 3), Some(100));
    for id in [2, 3, 4] {
        assert_eq!(offset(chain.graph(), id), 0, "node {id}");
    }
}

#[test]
fn last_sibling_moving_down_loses_one_point() {
    let mut chain = three_children().build_chain();

    chain.change_priority(4, Down).unwrap();

    assert_eq!(priority(&chain, 4), Some(99));
}

#[test]
fn priority_never_drops_below_the_floor() {
    let mut chain = three_children().priority(4, MIN_PRIORITY).build_chain();

    chain.change_priority(4, Down).unwrap();

    assert_eq!(priority(&chain, 4), Some(MIN_PRIORITY));
}

#[test]
fn node_without_a_direct_parent_adjusts_alone() {
    let mut chain = GraphBuilder::new("line").path(&[0, 1, 2]).build_chain();

    chain.change_priority(2, Up).unwrap();

    assert_eq!(priority(&chain, 2), Some(101));
    assert_eq!(priority(&chain, 1), None);
}

#[test]
fn blocked_default_priority_applies_to_swaps() {
    let mut chain = three_children().build_chain();
    chain.block(2, &BlockCode::Event("waiting".into()), t0()).unwrap();

    // Ranked by priority: 3 (100), 4 (100), 2 (50); 2 moves up past 4.
    chain.change_priority(2, Up).unwrap();

    assert_eq!(priority(&chain, 2), Some(100));
    assert_eq!(priority(&chain, 4), Some(50));
}

#[test]
fn custom_defaults_change_the_effective_priority() {
    let defaults = PriorityDefaults {
        executable_default: 10,
        blocked_default: 5,
    };
    let mut graph = three_children().defaults(defaults).build();

    let updated = operators::change_priority(&mut graph, 2, Up, &defaults).unwrap();

    assert_eq!(updated, 11);
}

#[test]
fn root_priority_is_immutable() {
    let mut chain = three_children().build_chain();
    assert!(matches!(
        chain.change_priority(0, Up),
        Err(MindChainError::RootImmutable)
    ));
}
