// src/engine/chain.rs

//! The mutable chain: graph store, finished archive and priority defaults.
//!
//! Every public mutation runs against a scratch copy of the graph, recomputes
//! it, and only then replaces the committed state. A failing mutation leaves
//! the chain exactly as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::engine::operators;
use crate::engine::{DEFAULT_TASK_NAME, Mutation};
use crate::errors::{MindChainError, Result};
use crate::graph::{
    Edge, FinishedArchive, FinishedGroup, MindGraph, PriorityDefaults, recompute_in_place,
    reorder_in_place,
};
use crate::types::{BlockCode, NodeId, PriorityDirection};

/// Structured result of a single mutation.
///
/// Useful for tests that want to apply mutations one by one and assert on
/// what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationStep {
    /// Id allocated for a node created by this step.
    pub created: Option<NodeId>,
    /// Ids moved to the archive by this step.
    pub removed: Vec<NodeId>,
    /// Edges added to reconnect the graph after a Finish.
    pub bridged: Vec<Edge>,
    /// Nodes whose deadline block expired.
    pub expired: Vec<NodeId>,
    /// Nodes whose status, level or offset changed and need redrawing.
    pub relayout: Vec<NodeId>,
}

impl MutationStep {
    /// Whether the step changed anything at all.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindChain {
    graph: MindGraph,
    archive: FinishedArchive,
    defaults: PriorityDefaults,
}

impl MindChain {
    /// An empty chain holding only the root.
    pub fn new(note_name: impl Into<String>, defaults: PriorityDefaults) -> Self {
        Self {
            graph: MindGraph::new(note_name),
            archive: FinishedArchive::new(),
            defaults,
        }
    }

    /// Assemble a chain from loaded parts. The graph is validated and
    /// recomputed; derived fields stored with it are ignored.
    pub fn from_parts(
        mut graph: MindGraph,
        archive: FinishedArchive,
        defaults: PriorityDefaults,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        recompute_in_place(&mut graph, now, &defaults)?;
        Ok(Self {
            graph,
            archive,
            defaults,
        })
    }

    pub fn graph(&self) -> &MindGraph {
        &self.graph
    }

    pub fn archive(&self) -> &FinishedArchive {
        &self.archive
    }

    pub fn defaults(&self) -> &PriorityDefaults {
        &self.defaults
    }

    pub fn into_parts(self) -> (MindGraph, FinishedArchive) {
        (self.graph, self.archive)
    }

    /// Next free id: above every id in the graph and in the archive, so an
    /// archive key never gets reused.
    pub fn next_id(&self) -> NodeId {
        let archived = self.archive.max_id().unwrap_or(0);
        self.graph.max_id().max(archived) + 1
    }

    /// Dispatch a [`Mutation`] to the matching operation.
    pub fn apply(&mut self, mutation: &Mutation, now: DateTime<Utc>) -> Result<MutationStep> {
        match mutation {
            Mutation::Finish(node) => self.finish(*node, now),
            Mutation::Block { node, code } => self.block(*node, code, now),
            Mutation::Unblock(node) => self.unblock(*node, now),
            Mutation::AddSibling { node, name } => self.add_sibling(*node, name.as_deref(), now),
            Mutation::AddChild { node, name } => self.add_child(*node, name.as_deref(), now),
            Mutation::ChangePriority { node, direction } => {
                self.change_priority(*node, *direction)
            }
            Mutation::Rename { node, name } => self.rename(*node, name),
            Mutation::SetContext { node, context } => self.set_context(*node, context.clone()),
        }
    }

    /// Mark `id` finished: its span moves to the archive and the graph is
    /// bridged across the gap.
    pub fn finish(&mut self, id: NodeId, now: DateTime<Utc>) -> Result<MutationStep> {
        let mut next = self.graph.clone();
        let outcome = operators::finish(&mut next, id)?;
        recompute_in_place(&mut next, now, &self.defaults)?;

        let removed: Vec<NodeId> = outcome.removed.iter().map(|n| n.id).collect();
        let relayout = self.commit(next);
        self.archive.push(FinishedGroup {
            trigger: outcome.trigger,
            finished_at: now,
            nodes: outcome.removed,
        });

        Ok(MutationStep {
            removed,
            bridged: outcome.bridges,
            relayout,
            ..MutationStep::default()
        })
    }

    pub fn block(&mut self, id: NodeId, code: &BlockCode, now: DateTime<Utc>) -> Result<MutationStep> {
        self.mutate(now, |graph| operators::block(graph, id, code))
    }

    pub fn unblock(&mut self, id: NodeId, now: DateTime<Utc>) -> Result<MutationStep> {
        self.mutate(now, |graph| operators::unblock(graph, id))
    }

    pub fn add_sibling(
        &mut self,
        id: NodeId,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MutationStep> {
        let new_id = self.next_id();
        let name = task_name(name);
        let mut step = self.mutate(now, |graph| operators::add_sibling(graph, id, new_id, &name))?;
        step.created = Some(new_id);
        Ok(step)
    }

    pub fn add_child(
        &mut self,
        id: NodeId,
        name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<MutationStep> {
        let new_id = self.next_id();
        let name = task_name(name);
        let mut step = self.mutate(now, |graph| operators::add_child(graph, id, new_id, &name))?;
        step.created = Some(new_id);
        Ok(step)
    }

    /// Priority only affects sibling order, so levels and status are not
    /// recomputed.
    pub fn change_priority(&mut self, id: NodeId, direction: PriorityDirection) -> Result<MutationStep> {
        let mut next = self.graph.clone();
        operators::change_priority(&mut next, id, direction, &self.defaults)?;
        reorder_in_place(&mut next, &self.defaults)?;
        let mut relayout = self.commit(next);
        if !relayout.contains(&id) {
            relayout.push(id);
        }
        Ok(MutationStep {
            relayout,
            ..MutationStep::default()
        })
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> Result<MutationStep> {
        if name.trim().is_empty() {
            return Err(MindChainError::EmptyName);
        }
        operators::rename(&mut self.graph, id, name.trim())?;
        Ok(MutationStep {
            relayout: vec![id],
            ..MutationStep::default()
        })
    }

    pub fn set_context(&mut self, id: NodeId, context: Option<String>) -> Result<MutationStep> {
        operators::set_context(&mut self.graph, id, context)?;
        Ok(MutationStep {
            relayout: vec![id],
            ..MutationStep::default()
        })
    }

    /// Clear expired deadline blocks and recompute once.
    ///
    /// A sweep that finds nothing leaves the graph untouched.
    pub fn sweep_deadlines(&mut self, now: DateTime<Utc>) -> Result<MutationStep> {
        let mut next = self.graph.clone();
        let expired = operators::expire_deadlines(&mut next, now);
        if expired.is_empty() {
            debug!("deadline sweep found nothing to expire");
            return Ok(MutationStep::default());
        }
        recompute_in_place(&mut next, now, &self.defaults)?;
        let relayout = self.commit(next);
        Ok(MutationStep {
            expired,
            relayout,
            ..MutationStep::default()
        })
    }

    /// Recompute the committed graph against `now`.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<Vec<NodeId>> {
        let mut next = self.graph.clone();
        recompute_in_place(&mut next, now, &self.defaults)?;
        Ok(self.commit(next))
    }

    fn mutate<F>(&mut self, now: DateTime<Utc>, op: F) -> Result<MutationStep>
    where
        F: FnOnce(&mut MindGraph) -> Result<()>,
    {
        let mut next = self.graph.clone();
        op(&mut next)?;
        if let Err(err) = recompute_in_place(&mut next, now, &self.defaults) {
            warn!(error = %err, "mutation left the graph invalid; discarded");
            return Err(err);
        }
        let relayout = self.commit(next);
        Ok(MutationStep {
            relayout,
            ..MutationStep::default()
        })
    }

    /// Swap in `next` and report the nodes whose drawing changed.
    fn commit(&mut self, next: MindGraph) -> Vec<NodeId> {
        let before: BTreeMap<NodeId, _> = self
            .graph
            .nodes()
            .map(|n| (n.id, (n.level, n.status, n.offset)))
            .collect();

        let relayout = next
            .nodes()
            .filter(|n| before.get(&n.id) != Some(&(n.level, n.status, n.offset)))
            .map(|n| n.id)
            .collect();

        self.graph = next;
        relayout
    }
}

fn task_name(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_TASK_NAME)
        .to_string()
}
