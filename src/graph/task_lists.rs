// src/graph/task_lists.rs

//! Task list views: what can be worked on now, and what is waiting.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::graph::index::GraphIndex;
use crate::graph::model::MindGraph;
use crate::types::{NodeId, ROOT_ID, Reason};

/// One row of the current task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTask {
    /// 1-based position in the list.
    pub number: usize,
    pub node: NodeId,
    pub name: String,
    /// Name of the level-1 task this one belongs to; `None` for level-1 tasks.
    pub parent: Option<String>,
}

/// One row of the blocked task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedTask {
    pub number: usize,
    pub node: NodeId,
    pub name: String,
    /// Ancestor names from level 1 down to the direct parent, joined by " - ".
    pub path: String,
    pub event: Option<String>,
    pub until: Option<DateTime<Utc>>,
}

/// Nodes whose reasons are exactly `{SelfExecutable}`, grouped under their
/// level-1 ancestor in pre-order.
pub fn current_tasks(graph: &MindGraph) -> Vec<CurrentTask> {
    let index = GraphIndex::build(graph);
    let candidates: Vec<NodeId> = preorder(&index)
        .into_iter()
        .filter(|id| {
            graph
                .node(*id)
                .is_some_and(|n| n.reasons.len() == 1 && n.reasons.contains(&Reason::SelfExecutable))
        })
        .collect();

    // Group by level-1 ancestor, keeping first-seen group order.
    let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
    for id in candidates {
        let Some(top) = level_one_ancestor(graph, &index, id) else {
            continue;
        };
        match groups.iter_mut().find(|(g, _)| *g == top) {
            Some((_, members)) => members.push(id),
            None => groups.push((top, vec![id])),
        }
    }

    let mut tasks = Vec::new();
    for (top, members) in groups {
        let top_name = graph.node(top).map(|n| n.name.clone()).unwrap_or_default();
        for id in members {
            let Some(node) = graph.node(id) else { continue };
            tasks.push(CurrentTask {
                number: tasks.len() + 1,
                node: id,
                name: node.name.clone(),
                parent: (node.level != 1).then(|| top_name.clone()),
            });
        }
    }
    tasks
}

/// Nodes carrying a direct block (`EventBlocked` or `TimeBlocked`), in
/// pre-order.
pub fn blocked_tasks(graph: &MindGraph) -> Vec<BlockedTask> {
    let index = GraphIndex::build(graph);
    let mut tasks = Vec::new();

    for id in preorder(&index) {
        let Some(node) = graph.node(id) else { continue };
        if !node.reasons.iter().any(|r| r.is_direct()) {
            continue;
        }
        tasks.push(BlockedTask {
            number: tasks.len() + 1,
            node: id,
            name: node.name.clone(),
            path: ancestor_path(graph, &index, id),
            event: node.blocked_reason.clone(),
            until: node.blocked_until,
        });
    }
    tasks
}

/// Pre-order walk from the root, visiting every node once.
fn preorder(index: &GraphIndex) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![ROOT_ID];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        if id != ROOT_ID {
            out.push(id);
        }
        let mut children = index.successors(id);
        children.reverse();
        stack.extend(children);
    }
    out
}

/// Follow first predecessors up to the level-1 ancestor (the node itself if
/// it is level 1).
fn level_one_ancestor(graph: &MindGraph, index: &GraphIndex, id: NodeId) -> Option<NodeId> {
    let mut current = id;
    let mut guard = graph.len();
    loop {
        let node = graph.node(current)?;
        if node.level <= 1 {
            return (current != ROOT_ID).then_some(current);
        }
        current = *index.predecessors(current).first()?;
        guard = guard.checked_sub(1)?;
    }
}

fn ancestor_path(graph: &MindGraph, index: &GraphIndex, id: NodeId) -> String {
    let mut names = Vec::new();
    let mut current = id;
    let mut guard = graph.len();

    while let Some(parent) = index.predecessors(current).first().copied() {
        if parent == ROOT_ID || guard == 0 {
            break;
        }
        guard -= 1;
        let Some(node) = graph.node(parent) else { break };
        names.push(node.name.clone());
        if node.level <= 1 {
            break;
        }
        current = parent;
    }

    names.reverse();
    names.join(" - ")
}
