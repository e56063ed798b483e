// src/graph/archive.rs

//! Finished-node archive: an append-only log of removed spans keyed by the
//! node whose Finish triggered the removal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::model::TaskNode;
use crate::types::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedGroup {
    /// Id of the node that was finished.
    pub trigger: NodeId,
    pub finished_at: DateTime<Utc>,
    /// The finished node first, then the rest of its span.
    pub nodes: Vec<TaskNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedArchive {
    #[serde(default)]
    groups: Vec<FinishedGroup>,
}

impl FinishedArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: FinishedGroup) {
        self.groups.push(group);
    }

    /// The group archived when `trigger` was finished.
    pub fn get(&self, trigger: NodeId) -> Option<&FinishedGroup> {
        self.groups.iter().rev().find(|g| g.trigger == trigger)
    }

    pub fn groups(&self) -> &[FinishedGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Highest node id ever archived; new ids are allocated above it so
    /// archive keys stay unambiguous.
    pub fn max_id(&self) -> Option<NodeId> {
        self.groups
            .iter()
            .flat_map(|g| g.nodes.iter().map(|n| n.id))
            .max()
    }
}
