// src/graph/convergence.rs

//! Convergence Locator and span helpers.

use std::collections::{BTreeSet, HashSet};

use tracing::trace;

use crate::graph::index::GraphIndex;
use crate::graph::model::MindGraph;
use crate::types::NodeId;

/// Find the nearest downstream node at which paths leaving `start` remerge.
///
/// Fast path: if `start` has exactly one outgoing edge and its target is not
/// deeper than `start`, that target is the convergence point.
///
/// Otherwise a depth-first search walks down from `start` (children in edge
/// order) and returns the first visited node whose level is `<=` the level
/// of `start`. Returns `None` when the branch runs out to leaves without
/// remerging, or when `start` is unknown.
pub fn find_convergence(graph: &MindGraph, index: &GraphIndex, start: NodeId) -> Option<NodeId> {
    let level = graph.node(start)?.level;

    let successors = index.successors(start);
    if let [only] = successors.as_slice() {
        if graph.level_of(*only) <= level {
            trace!(node = start, convergence = *only, "convergence via single continuation");
            return Some(*only);
        }
    }

    let mut visited: HashSet<NodeId> = HashSet::new();
    visited.insert(start);
    // Stack of (node, next child position) to keep recursive visiting order.
    let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];

    while let Some((node, pos)) = stack.pop() {
        let children = index.successors(node);
        let Some(&child) = children.get(pos) else {
            continue;
        };
        stack.push((node, pos + 1));

        if !visited.insert(child) {
            continue;
        }
        if child != start && graph.level_of(child) <= level {
            trace!(node = start, convergence = child, "convergence via depth-first search");
            return Some(child);
        }
        stack.push((child, 0));
    }

    None
}

/// The span of nodes owned by the branch starting at `start`, stopping
/// before `stop`.
///
/// `start` is always in the span. Another node reachable from `start` joins
/// the span only when every one of its predecessors is already in it, so
/// nodes that are also fed from outside the branch stay out. `stop` never
/// joins.
pub fn span_until(
    index: &GraphIndex,
    order: &[NodeId],
    start: NodeId,
    stop: Option<NodeId>,
) -> BTreeSet<NodeId> {
    let mut span = BTreeSet::new();
    if !index.contains(start) {
        return span;
    }
    span.insert(start);

    let reachable = index.reachable_from(start);
    for &id in order {
        if id == start || Some(id) == stop || !reachable.contains(&id) {
            continue;
        }
        let preds = index.predecessors(id);
        if !preds.is_empty() && preds.iter().all(|p| span.contains(p)) {
            span.insert(id);
        }
    }

    span
}
