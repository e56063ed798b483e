// src/graph/ordering.rs

//! Sibling Orderer: sorts the direct children of every diverging node by
//! `(status rank, -priority)` and turns slot moves into horizontal offsets.
//!
//! This is a rendering hint only; it never touches `status` or `level`.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::graph::convergence::{find_convergence, span_until};
use crate::graph::index::GraphIndex;
use crate::graph::model::{MindGraph, TaskNode};
use crate::types::{NodeId, Status};

/// Effective priority of nodes that have no manual priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PriorityDefaults {
    #[serde(default = "default_executable_priority")]
    pub executable_default: i64,
    #[serde(default = "default_blocked_priority")]
    pub blocked_default: i64,
}

fn default_executable_priority() -> i64 {
    100
}

fn default_blocked_priority() -> i64 {
    50
}

impl Default for PriorityDefaults {
    fn default() -> Self {
        Self {
            executable_default: default_executable_priority(),
            blocked_default: default_blocked_priority(),
        }
    }
}

impl PriorityDefaults {
    pub fn effective(&self, node: &TaskNode) -> i64 {
        node.priority.unwrap_or(match node.status {
            Status::Executable => self.executable_default,
            Status::Blocked => self.blocked_default,
        })
    }
}

/// Result of one ordering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingOrder {
    /// For every node with two or more direct children: the children in
    /// sorted order.
    pub groups: BTreeMap<NodeId, Vec<NodeId>>,
    /// Accumulated slot offset per node (absent means `0`).
    pub offsets: BTreeMap<NodeId, i64>,
}

impl SiblingOrder {
    pub fn offset_of(&self, id: NodeId) -> i64 {
        self.offsets.get(&id).copied().unwrap_or(0)
    }
}

/// Sort key among siblings: Executable first, then higher priority, then
/// the original drawing slot.
pub fn sibling_key(node: &TaskNode, slot: usize, defaults: &PriorityDefaults) -> (u8, Reverse<i64>, usize) {
    (node.status.rank(), Reverse(defaults.effective(node)), slot)
}

/// Compute the sibling order without touching the graph.
///
/// A child's original slot is its position among its parent's edges. When
/// sorting moves it by `delta` slots, the child and every node in its span
/// (up to but excluding its convergence point) receive `delta`. Nested
/// groups add up.
pub fn compute_order(
    graph: &MindGraph,
    index: &GraphIndex,
    order: &[NodeId],
    defaults: &PriorityDefaults,
) -> SiblingOrder {
    let mut result = SiblingOrder::default();

    for &parent in order {
        let children = index.direct_children(graph, parent);
        if children.len() < 2 {
            continue;
        }

        let mut sorted: Vec<(usize, NodeId)> = children.iter().copied().enumerate().collect();
        sorted.sort_by_key(|(slot, id)| {
            graph
                .node(*id)
                .map(|n| sibling_key(n, *slot, defaults))
                .unwrap_or((u8::MAX, Reverse(i64::MIN), *slot))
        });

        for (new_slot, (old_slot, child)) in sorted.iter().enumerate() {
            let delta = new_slot as i64 - *old_slot as i64;
            if delta == 0 {
                continue;
            }
            let stop = find_convergence(graph, index, *child);
            for id in span_until(index, order, *child, stop) {
                *result.offsets.entry(id).or_insert(0) += delta;
            }
        }

        result
            .groups
            .insert(parent, sorted.into_iter().map(|(_, id)| id).collect());
    }

    result
}

/// Run the orderer and write offsets onto the nodes.
///
/// Returns the ids whose offset changed, for the rendering collaborator.
pub fn apply_order(
    graph: &mut MindGraph,
    index: &GraphIndex,
    order: &[NodeId],
    defaults: &PriorityDefaults,
) -> Vec<NodeId> {
    let computed = compute_order(graph, index, order, defaults);
    let mut changed = Vec::new();

    for node in graph.nodes_mut() {
        let offset = computed.offset_of(node.id);
        if node.offset != offset {
            node.offset = offset;
            changed.push(node.id);
        }
    }

    if !changed.is_empty() {
        debug!(?changed, "sibling offsets changed");
    }
    changed
}
