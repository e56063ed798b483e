// src/store/record.rs

//! On-disk snapshot shape.
//!
//! Edges are stored in insertion order, since sibling slots and the
//! convergence search both read that order. Files without an edge list fall
//! back to each record's `parent_ids`; a record without parents hangs off
//! the root.

use std::collections::BTreeSet;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::MindChain;
use crate::errors::{MindChainError, Result};
use crate::graph::{Edge, FinishedArchive, MindGraph, PriorityDefaults, TaskNode};
use crate::types::{NodeId, ROOT_ID, ReasonSet, Status};

pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub reasons: ReasonSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_ids: Vec<NodeId>,
}

impl From<&TaskNode> for NodeRecord {
    fn from(node: &TaskNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            context: node.context.clone(),
            level: node.level,
            priority: node.priority,
            status: node.status,
            reasons: node.reasons.clone(),
            blocked_reason: node.blocked_reason.clone(),
            blocked_until: node.blocked_until,
            parent_ids: node.parent_ids.clone(),
        }
    }
}

impl NodeRecord {
    /// Manual fields only; derived fields are rebuilt on load.
    fn to_node(&self) -> TaskNode {
        let mut node = TaskNode::new(self.id, self.name.clone());
        node.context = self.context.clone();
        node.priority = self.priority;
        node.blocked_reason = self.blocked_reason.clone();
        node.blocked_until = self.blocked_until;
        node
    }
}

/// Everything needed to restore a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Note name (the root's name).
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub archive: FinishedArchive,
}

impl Snapshot {
    pub fn capture(graph: &MindGraph, archive: &FinishedArchive) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            name: graph.name().to_string(),
            nodes: graph.task_nodes().map(NodeRecord::from).collect(),
            edges: graph.edges().to_vec(),
            archive: archive.clone(),
        }
    }

    pub fn of_chain(chain: &MindChain) -> Self {
        Self::capture(chain.graph(), chain.archive())
    }

    /// Rebuild the graph store from the records. Derived fields are left for
    /// the next recompute.
    pub fn to_graph(&self) -> Result<MindGraph> {
        let mut graph = MindGraph::new(self.name.clone());
        let mut seen = BTreeSet::new();

        for record in &self.nodes {
            if record.id == ROOT_ID {
                return Err(anyhow!("snapshot record uses the reserved root id {ROOT_ID}").into());
            }
            if !seen.insert(record.id) {
                return Err(anyhow!("duplicate node id {} in snapshot", record.id).into());
            }
            graph.insert_node(record.to_node());
        }

        if !self.edges.is_empty() {
            for edge in &self.edges {
                for end in [edge.source, edge.target] {
                    if !graph.contains(end) {
                        return Err(MindChainError::InvalidReference(end));
                    }
                }
                graph.add_edge(edge.source, edge.target);
            }
            return Ok(graph);
        }

        for record in &self.nodes {
            if record.parent_ids.is_empty() {
                graph.add_edge(ROOT_ID, record.id);
                continue;
            }
            for parent in &record.parent_ids {
                if !graph.contains(*parent) {
                    return Err(MindChainError::InvalidReference(*parent));
                }
                graph.add_edge(*parent, record.id);
            }
        }

        Ok(graph)
    }

    /// Rebuild, validate and recompute a chain.
    pub fn restore(&self, defaults: PriorityDefaults, now: DateTime<Utc>) -> Result<MindChain> {
        let graph = self.to_graph()?;
        MindChain::from_parts(graph, self.archive.clone(), defaults, now)
    }
}
