// src/engine/operators.rs

//! Structural and field mutations on a [`MindGraph`].
//!
//! These functions only rewire edges and set fields; they never recompute
//! levels or status. [`MindChain`](super::MindChain) runs them on a scratch
//! copy and recomputes before committing.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::errors::{MindChainError, Result};
use crate::graph::{
    Edge, GraphIndex, MindGraph, PriorityDefaults, TaskNode, find_convergence, span_until,
};
use crate::types::{BlockCode, NodeId, PriorityDirection, ROOT_ID};

/// Lowest priority reachable by lowering a node that has no sibling to swap with.
pub const MIN_PRIORITY: i64 = 1;

/// What a Finish removed and how it bridged the gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishOutcome {
    pub trigger: NodeId,
    pub convergence: Option<NodeId>,
    /// Removed nodes, the finished node first.
    pub removed: Vec<TaskNode>,
    /// Edges added to reconnect upstream nodes to the convergence point.
    pub bridges: Vec<Edge>,
}

fn ensure_not_root(id: NodeId) -> Result<()> {
    if id == ROOT_ID {
        return Err(MindChainError::RootImmutable);
    }
    Ok(())
}

/// Remove the span owned by `id` and bridge its upstream edges to the
/// convergence point, if there is one.
///
/// With a convergence point `c`, the span is every node from `id` up to but
/// excluding `c`. Upstream nodes that pointed into the span get an edge to
/// `c`, even when another path to `c` survives.
///
/// Without a convergence point the whole downstream span is removed and
/// edges touching it are dropped. Downstream nodes that still have a live
/// predecessor outside the span are kept.
pub fn finish(graph: &mut MindGraph, id: NodeId) -> Result<FinishOutcome> {
    ensure_not_root(id)?;
    graph.require(id)?;

    let index = GraphIndex::build(graph);
    let order = index.topo_order()?;
    let convergence = find_convergence(graph, &index, id);
    let span = span_until(&index, &order, id, convergence);

    if convergence.is_none() {
        warn!(
            node = id,
            span = span.len(),
            "no convergence point below finished node; removing its whole subtree"
        );
    }

    let mut upstream: Vec<NodeId> = Vec::new();
    for edge in graph.edges() {
        if !span.contains(&edge.source)
            && span.contains(&edge.target)
            && !upstream.contains(&edge.source)
        {
            upstream.push(edge.source);
        }
    }

    let mut removed = Vec::with_capacity(span.len());
    for node_id in std::iter::once(id).chain(order.iter().copied().filter(|n| *n != id)) {
        if span.contains(&node_id) {
            if let Some(node) = graph.remove_node(node_id) {
                removed.push(node);
            }
        }
    }

    let mut bridges = Vec::new();
    if let Some(target) = convergence {
        for source in upstream {
            if graph.add_edge(source, target) {
                bridges.push(Edge::new(source, target));
            }
        }
    }

    info!(
        node = id,
        convergence = ?convergence,
        removed = removed.len(),
        bridges = bridges.len(),
        "finished node"
    );

    Ok(FinishOutcome {
        trigger: id,
        convergence,
        removed,
        bridges,
    })
}

/// Set the manual block field selected by `code`. Other fields are left as
/// they are, so blocking is additive.
pub fn block(graph: &mut MindGraph, id: NodeId, code: &BlockCode) -> Result<()> {
    ensure_not_root(id)?;
    let node = graph.require_mut(id)?;
    match code {
        BlockCode::Event(text) => node.blocked_reason = Some(text.clone()),
        BlockCode::Until(until) => node.blocked_until = Some(*until),
    }
    info!(node = id, ?code, "blocked node");
    Ok(())
}

/// Clear both manual block fields.
pub fn unblock(graph: &mut MindGraph, id: NodeId) -> Result<()> {
    ensure_not_root(id)?;
    let node = graph.require_mut(id)?;
    node.blocked_reason = None;
    node.blocked_until = None;
    info!(node = id, "unblocked node");
    Ok(())
}

/// Clear every deadline that is not in the future. Event blocks stay.
///
/// Returns the ids whose deadline was cleared.
pub fn expire_deadlines(graph: &mut MindGraph, now: DateTime<Utc>) -> Vec<NodeId> {
    let mut expired = Vec::new();
    for node in graph.nodes_mut() {
        if node.blocked_until.is_some_and(|until| until <= now) {
            node.blocked_until = None;
            expired.push(node.id);
        }
    }
    if !expired.is_empty() {
        info!(?expired, "deadline blocks expired");
    }
    expired
}

/// Add `new_id` as a sibling of `id` (same level).
///
/// With a convergence point `c`, the new node gets the same upstream edges
/// as `id` and feeds into `c`. Without one, every leaf of `id`'s branch
/// feeds into the new node.
pub fn add_sibling(graph: &mut MindGraph, id: NodeId, new_id: NodeId, name: &str) -> Result<()> {
    ensure_not_root(id)?;
    let level = graph.require(id)?.level;

    let index = GraphIndex::build(graph);
    let convergence = find_convergence(graph, &index, id);

    let mut node = TaskNode::new(new_id, name);
    node.level = level;
    graph.insert_node(node);

    match convergence {
        Some(target) => {
            for parent in index.predecessors(id) {
                graph.add_edge(parent, new_id);
            }
            graph.add_edge(new_id, target);
            debug!(node = id, new = new_id, convergence = target, "sibling spliced before convergence");
        }
        None => {
            for leaf in index.leaves_under(id) {
                graph.add_edge(leaf, new_id);
            }
            debug!(node = id, new = new_id, "sibling appended after branch leaves");
        }
    }

    info!(node = id, new = new_id, "added sibling");
    Ok(())
}

/// Add `new_id` as a child of `id` (one level deeper).
///
/// Wiring follows the convergence point `c` of `id`:
/// - no `c` (a leaf, an open branch, or the root): the new node hangs off `id`;
/// - `c` is the plain continuation of `id`: the new node is spliced in
///   between, `id -> new -> c`;
/// - `id` already has sub-tasks: the new node becomes one more of them and
///   funnels into `c`.
pub fn add_child(graph: &mut MindGraph, id: NodeId, new_id: NodeId, name: &str) -> Result<()> {
    let level = graph.require(id)?.level;

    let index = GraphIndex::build(graph);
    let convergence = if id == ROOT_ID {
        None
    } else {
        find_convergence(graph, &index, id)
    };
    let has_children = !index.direct_children(graph, id).is_empty();

    let mut node = TaskNode::new(new_id, name);
    node.level = level + 1;
    graph.insert_node(node);

    match convergence {
        Some(target) if !has_children => {
            graph.remove_edge(id, target);
            graph.add_edge(id, new_id);
            graph.add_edge(new_id, target);
            debug!(node = id, new = new_id, convergence = target, "child spliced before continuation");
        }
        Some(target) => {
            graph.add_edge(id, new_id);
            graph.add_edge(new_id, target);
            debug!(node = id, new = new_id, convergence = target, "child funnels into convergence");
        }
        None => {
            graph.add_edge(id, new_id);
        }
    }

    info!(node = id, new = new_id, "added child");
    Ok(())
}

/// Move `id` one slot up or down among the siblings sharing its direct
/// parent, in priority order.
///
/// The node swaps priorities with its neighbour in that direction; on a tie
/// it steps one past it. Without a neighbour the priority moves by one
/// (never below [`MIN_PRIORITY`]). Returns the node's new priority.
pub fn change_priority(
    graph: &mut MindGraph,
    id: NodeId,
    direction: PriorityDirection,
    defaults: &PriorityDefaults,
) -> Result<i64> {
    ensure_not_root(id)?;
    graph.require(id)?;

    let index = GraphIndex::build(graph);
    let siblings = match index.direct_parents(graph, id).first() {
        Some(parent) => index.direct_children(graph, *parent),
        None => vec![id],
    };

    let effective = |graph: &MindGraph, n: NodeId| {
        graph.node(n).map(|node| defaults.effective(node)).unwrap_or_default()
    };

    let mut ranked: Vec<(usize, NodeId)> = siblings.into_iter().enumerate().collect();
    ranked.sort_by_key(|(slot, n)| (Reverse(effective(graph, *n)), *slot));
    let position = ranked.iter().position(|(_, n)| *n == id).unwrap_or(0);

    let neighbour = match direction {
        PriorityDirection::Up => position.checked_sub(1).map(|p| ranked[p].1),
        PriorityDirection::Down => ranked.get(position + 1).map(|(_, n)| *n),
    };

    let mine = effective(graph, id);
    let updated = match neighbour {
        Some(other) => {
            let theirs = effective(graph, other);
            if theirs != mine {
                graph.require_mut(other)?.priority = Some(mine);
                theirs
            } else {
                match direction {
                    PriorityDirection::Up => mine + 1,
                    PriorityDirection::Down => (mine - 1).max(MIN_PRIORITY),
                }
            }
        }
        None => match direction {
            PriorityDirection::Up => mine + 1,
            PriorityDirection::Down => (mine - 1).max(MIN_PRIORITY),
        },
    };

    graph.require_mut(id)?.priority = Some(updated);
    info!(node = id, ?direction, priority = updated, "priority changed");
    Ok(updated)
}

pub fn rename(graph: &mut MindGraph, id: NodeId, name: &str) -> Result<()> {
    graph.require_mut(id)?.name = name.to_string();
    Ok(())
}

pub fn set_context(graph: &mut MindGraph, id: NodeId, context: Option<String>) -> Result<()> {
    ensure_not_root(id)?;
    graph.require_mut(id)?.context = context.filter(|c| !c.trim().is_empty());
    Ok(())
}
