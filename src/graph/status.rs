// src/graph/status.rs

//! Status Propagator.
//!
//! Status and reasons are a pure function of structure plus the manual
//! fields (`blocked_reason`, `blocked_until`) and the current time. Nothing
//! from the previous pass is read back, so running the pipeline twice yields
//! the same snapshot.
//!
//! Each rule is a separate transform that reports which nodes receive its
//! tag, given the tags accumulated so far:
//!
//! 1. convergence shadow (`ConvergenceBelow`)
//! 2. direct block (`EventBlocked`, `TimeBlocked`)
//! 3. child-blocked bubbling, bottom-up (`AllChildrenBlocked`)
//! 4. parent-blocked propagation, top-down (`ParentBlocked`)
//! 5. executable resolution (`SelfExecutable`, `HasExecutableChild`)

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::graph::convergence::find_convergence;
use crate::graph::index::GraphIndex;
use crate::graph::model::MindGraph;
use crate::types::{NodeId, ROOT_ID, Reason, ReasonSet, status_for};

type ReasonMap = BTreeMap<NodeId, ReasonSet>;

/// Compute and store `reasons` and `status` on every non-root node.
pub fn apply_status(graph: &mut MindGraph, index: &GraphIndex, order: &[NodeId], now: DateTime<Utc>) {
    let reasons = propagate(graph, index, order, now);

    for node in graph.nodes_mut() {
        if node.is_root() {
            node.reasons.clear();
            node.status = Default::default();
            continue;
        }
        let set = reasons.get(&node.id).cloned().unwrap_or_default();
        node.status = status_for(&set);
        node.reasons = set;
    }
}

/// Run the rule pipeline and return the reason set of every non-root node.
pub fn propagate(
    graph: &MindGraph,
    index: &GraphIndex,
    order: &[NodeId],
    now: DateTime<Utc>,
) -> ReasonMap {
    let mut reasons: ReasonMap = graph
        .task_nodes()
        .map(|n| (n.id, ReasonSet::new()))
        .collect();

    for id in convergence_shadow(graph, index) {
        tag(&mut reasons, id, Reason::ConvergenceBelow);
    }

    for (id, direct) in direct_blocks(graph, now) {
        if let Some(set) = reasons.get_mut(&id) {
            set.extend(direct);
        }
    }

    for id in children_blocked(graph, index, order, &reasons) {
        tag(&mut reasons, id, Reason::AllChildrenBlocked);
    }

    for id in parent_blocked(graph, index, order, &reasons) {
        tag(&mut reasons, id, Reason::ParentBlocked);
    }

    for (id, reason) in executable_resolution(graph, index, &reasons) {
        tag(&mut reasons, id, reason);
    }

    debug!(
        blocked = reasons.values().filter(|r| is_blocked(r)).count(),
        total = reasons.len(),
        "status propagated"
    );
    reasons
}

fn tag(reasons: &mut ReasonMap, id: NodeId, reason: Reason) {
    if let Some(set) = reasons.get_mut(&id) {
        set.insert(reason);
    }
}

fn is_blocked(set: &ReasonSet) -> bool {
    set.iter().any(|r| r.is_blocking())
}

/// Rule 1: every node that is the convergence point of some upstream node
/// waits for that node's branch to finish.
pub fn convergence_shadow(graph: &MindGraph, index: &GraphIndex) -> BTreeSet<NodeId> {
    graph
        .task_nodes()
        .filter_map(|n| find_convergence(graph, index, n.id))
        .filter(|c| *c != ROOT_ID)
        .collect()
}

/// Rule 2: tags derived from each node's own manual fields.
pub fn direct_blocks(graph: &MindGraph, now: DateTime<Utc>) -> ReasonMap {
    graph
        .task_nodes()
        .filter_map(|n| {
            let mut set = ReasonSet::new();
            if n.has_event_block() {
                set.insert(Reason::EventBlocked);
            }
            if n.has_active_deadline(now) {
                set.insert(Reason::TimeBlocked);
            }
            (!set.is_empty()).then_some((n.id, set))
        })
        .collect()
}

/// Rule 3: walking bottom-up, a node whose direct children are all blocked
/// is blocked too. Children's `ParentBlocked` (rule 4) is not considered.
pub fn children_blocked(
    graph: &MindGraph,
    index: &GraphIndex,
    order: &[NodeId],
    reasons: &ReasonMap,
) -> BTreeSet<NodeId> {
    let mut result = BTreeSet::new();

    for &id in order.iter().rev() {
        if id == ROOT_ID {
            continue;
        }
        let children = index.direct_children(graph, id);
        if children.is_empty() {
            continue;
        }
        let all_blocked = children.iter().all(|c| {
            result.contains(c) || reasons.get(c).is_some_and(is_blocked)
        });
        if all_blocked {
            result.insert(id);
        }
    }

    result
}

/// Rule 4: walking top-down, a node whose single direct parent is blocked
/// inherits the block. Nodes with several direct parents are exempt.
pub fn parent_blocked(
    graph: &MindGraph,
    index: &GraphIndex,
    order: &[NodeId],
    reasons: &ReasonMap,
) -> BTreeSet<NodeId> {
    let mut result = BTreeSet::new();

    for &id in order {
        if id == ROOT_ID {
            continue;
        }
        let parents = index.direct_parents(graph, id);
        let [parent] = parents.as_slice() else {
            continue;
        };
        if *parent == ROOT_ID {
            continue;
        }
        let parent_blocked =
            result.contains(parent) || reasons.get(parent).is_some_and(is_blocked);
        if parent_blocked {
            result.insert(id);
        }
    }

    result
}

/// Rule 5: an unblocked leaf is `SelfExecutable`; an unblocked node with an
/// executable direct child is `HasExecutableChild`.
pub fn executable_resolution(
    graph: &MindGraph,
    index: &GraphIndex,
    reasons: &ReasonMap,
) -> Vec<(NodeId, Reason)> {
    reasons
        .iter()
        .filter(|(_, set)| !is_blocked(set))
        .map(|(&id, _)| {
            let children = index.direct_children(graph, id);
            let any_executable = children
                .iter()
                .any(|c| reasons.get(c).is_some_and(|set| !is_blocked(set)));
            let reason = if any_executable {
                Reason::HasExecutableChild
            } else {
                Reason::SelfExecutable
            };
            (id, reason)
        })
        .collect()
}
