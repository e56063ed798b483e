// src/graph/levels.rs

//! Level Assigner: branch depth from the root.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::graph::index::GraphIndex;
use crate::graph::model::MindGraph;
use crate::types::{NodeId, ROOT_ID};

/// Assign `level` to every node, walking `order` (a topological order) so
/// that all predecessors are settled before a node is visited.
///
/// Each incoming edge proposes a level for its target:
/// - from the root: `1`,
/// - from a node with a single outgoing edge: the source's level,
/// - from a diverging node (two or more outgoing edges): source level + 1.
///
/// A node with one parent takes that proposal. A convergence target takes the
/// level its predecessors agree on; on disagreement the minimum wins so the
/// pass stays total.
pub fn assign_levels(graph: &mut MindGraph, index: &GraphIndex, order: &[NodeId]) {
    let levels = compute_levels(graph, index, order);
    for node in graph.nodes_mut() {
        if let Some(level) = levels.get(&node.id) {
            node.level = *level;
        }
    }
}

/// Pure level computation; see [`assign_levels`].
pub fn compute_levels(
    graph: &MindGraph,
    index: &GraphIndex,
    order: &[NodeId],
) -> BTreeMap<NodeId, u32> {
    let mut levels: BTreeMap<NodeId, u32> = BTreeMap::new();
    levels.insert(ROOT_ID, 0);

    for &id in order {
        if id == ROOT_ID || !graph.contains(id) {
            continue;
        }

        let proposals: Vec<u32> = index
            .predecessors(id)
            .into_iter()
            .map(|parent| proposed_level(index, &levels, parent))
            .collect();

        let level = match proposals.as_slice() {
            [] => {
                warn!(node = id, "node without predecessors; defaulting level to 1");
                1
            }
            [only] => *only,
            many => {
                let min = many.iter().copied().min().unwrap_or(1);
                if many.iter().any(|l| *l != min) {
                    warn!(
                        node = id,
                        ?many,
                        "converging predecessors disagree on level; using minimum"
                    );
                }
                min
            }
        };

        levels.insert(id, level);
    }

    debug!(assigned = levels.len(), "levels assigned");
    levels
}

fn proposed_level(index: &GraphIndex, levels: &BTreeMap<NodeId, u32>, parent: NodeId) -> u32 {
    if parent == ROOT_ID {
        return 1;
    }
    let parent_level = levels.get(&parent).copied().unwrap_or(0);
    if index.out_degree(parent) >= 2 {
        parent_level + 1
    } else {
        parent_level
    }
}
