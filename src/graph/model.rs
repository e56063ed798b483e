// src/graph/model.rs

//! Node and edge store.
//!
//! Nodes live in an arena keyed by id; edges are a flat list of
//! `(source, target)` pairs. Nodes carry no back-references, so a graph can
//! be cloned, compared and serialised directly. Adjacency is rebuilt by
//! [`GraphIndex`](super::GraphIndex) on every pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MindChainError, Result};
use crate::graph::index::GraphIndex;
use crate::types::{NodeId, ROOT_ID, ReasonSet, Status};

/// A single task in the mind chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: NodeId,
    /// Branch depth from the root. Derived.
    #[serde(default)]
    pub level: u32,
    pub name: String,
    #[serde(default)]
    pub context: Option<String>,
    /// Derived from `reasons`.
    #[serde(default)]
    pub status: Status,
    /// Derived.
    #[serde(default)]
    pub reasons: ReasonSet,
    /// Manual ordering hint among siblings. `None` falls back to the
    /// status-dependent default.
    #[serde(default)]
    pub priority: Option<i64>,
    /// Manual: description of the event this node waits on.
    #[serde(default)]
    pub blocked_reason: Option<String>,
    /// Manual: the node is blocked until this instant.
    #[serde(default)]
    pub blocked_until: Option<DateTime<Utc>>,
    /// Derived from edges on every pass; not authoritative.
    #[serde(default)]
    pub parent_ids: Vec<NodeId>,
    /// Horizontal slot offset produced by the sibling orderer.
    #[serde(default)]
    pub offset: i64,
}

impl TaskNode {
    /// A fresh node: Executable with `{SelfExecutable}` until the next pass
    /// says otherwise.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        let mut reasons = ReasonSet::new();
        reasons.insert(crate::types::Reason::SelfExecutable);
        Self {
            id,
            level: 0,
            name: name.into(),
            context: None,
            status: Status::Executable,
            reasons,
            priority: None,
            blocked_reason: None,
            blocked_until: None,
            parent_ids: Vec::new(),
            offset: 0,
        }
    }

    /// The synthetic root; it carries the note name.
    pub fn root(note_name: impl Into<String>) -> Self {
        let mut node = Self::new(ROOT_ID, note_name);
        node.reasons.clear();
        node
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    /// Whether an event block is set.
    pub fn has_event_block(&self) -> bool {
        self.blocked_reason
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }

    /// Whether a deadline block is set and still in the future.
    pub fn has_active_deadline(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }
}

/// Directed edge: `target` comes after `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.source == id || self.target == id
    }
}

/// The graph store: node arena plus edge list, rooted at node `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindGraph {
    nodes: BTreeMap<NodeId, TaskNode>,
    edges: Vec<Edge>,
}

impl MindGraph {
    /// A graph holding only the root.
    pub fn new(note_name: impl Into<String>) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_ID, TaskNode::root(note_name));
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    /// Note name stored on the root.
    pub fn name(&self) -> &str {
        self.nodes
            .get(&ROOT_ID)
            .map(|n| n.name.as_str())
            .unwrap_or_default()
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&TaskNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut TaskNode> {
        self.nodes.get_mut(&id)
    }

    /// Look up a node or fail with `InvalidReference`.
    pub fn require(&self, id: NodeId) -> Result<&TaskNode> {
        self.nodes
            .get(&id)
            .ok_or(MindChainError::InvalidReference(id))
    }

    pub fn require_mut(&mut self, id: NodeId) -> Result<&mut TaskNode> {
        self.nodes
            .get_mut(&id)
            .ok_or(MindChainError::InvalidReference(id))
    }

    /// Level of a node, `0` for unknown ids.
    pub fn level_of(&self, id: NodeId) -> u32 {
        self.nodes.get(&id).map(|n| n.level).unwrap_or(0)
    }

    /// All nodes including the root, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TaskNode> {
        self.nodes.values_mut()
    }

    /// All nodes except the root, ordered by id.
    pub fn task_nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.values().filter(|n| !n.is_root())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// Insert (or replace) a node.
    pub fn insert_node(&mut self, node: TaskNode) {
        self.nodes.insert(node.id, node);
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<TaskNode> {
        let removed = self.nodes.remove(&id)?;
        self.edges.retain(|e| !e.touches(id));
        Some(removed)
    }

    /// Add an edge unless it already exists or is a self-loop.
    ///
    /// Returns `true` if the edge was added.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        if source == target || self.has_edge(source, target) {
            return false;
        }
        self.edges.push(Edge::new(source, target));
        true
    }

    /// Returns `true` if an edge was removed.
    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target));
        self.edges.len() != before
    }

    /// Highest id currently in the graph.
    pub fn max_id(&self) -> NodeId {
        self.nodes.keys().next_back().copied().unwrap_or(ROOT_ID)
    }

    /// Rebuild every node's `parent_ids` from the current edges.
    pub fn refresh_parent_ids(&mut self, index: &GraphIndex) {
        for node in self.nodes.values_mut() {
            node.parent_ids = if node.is_root() {
                Vec::new()
            } else {
                index.predecessors(node.id)
            };
        }
    }
}
