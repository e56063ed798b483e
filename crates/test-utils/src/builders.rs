#![allow(dead_code)]

use chrono::{DateTime, Utc};
use mindchain::engine::MindChain;
use mindchain::graph::{MindGraph, PriorityDefaults, TaskNode, recompute};
use mindchain::types::NodeId;

use crate::t0;

/// Builder for `MindGraph` to simplify test setup.
///
/// Edges create missing endpoints on the fly, named `T<id>`, so most
/// fixtures only need the edge list.
pub struct GraphBuilder {
    graph: MindGraph,
    now: DateTime<Utc>,
    defaults: PriorityDefaults,
}

impl GraphBuilder {
    pub fn new(note_name: &str) -> Self {
        Self {
            graph: MindGraph::new(note_name),
            now: t0(),
            defaults: PriorityDefaults::default(),
        }
    }

    pub fn node(mut self, id: NodeId, name: &str) -> Self {
        self.graph.insert_node(TaskNode::new(id, name));
        self
    }

    pub fn edge(mut self, source: NodeId, target: NodeId) -> Self {
        self.ensure(source);
        self.ensure(target);
        self.graph.add_edge(source, target);
        self
    }

    /// Consecutive edges along `ids`.
    pub fn path(mut self, ids: &[NodeId]) -> Self {
        for pair in ids.windows(2) {
            self = self.edge(pair[0], pair[1]);
        }
        self
    }

    pub fn event_block(mut self, id: NodeId, event: &str) -> Self {
        self.ensure(id);
        self.node_mut(id).blocked_reason = Some(event.to_string());
        self
    }

    pub fn deadline(mut self, id: NodeId, until: DateTime<Utc>) -> Self {
        self.ensure(id);
        self.node_mut(id).blocked_until = Some(until);
        self
    }

    pub fn priority(mut self, id: NodeId, priority: i64) -> Self {
        self.ensure(id);
        self.node_mut(id).priority = Some(priority);
        self
    }

    pub fn context(mut self, id: NodeId, context: &str) -> Self {
        self.ensure(id);
        self.node_mut(id).context = Some(context.to_string());
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn defaults(mut self, defaults: PriorityDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// The graph as written, without any recompute.
    pub fn build_raw(self) -> MindGraph {
        self.graph
    }

    /// The graph after a full recompute at the builder's `now`.
    pub fn build(self) -> MindGraph {
        recompute(&self.graph, self.now, &self.defaults).expect("fixture graph must be valid")
    }

    pub fn build_chain(self) -> MindChain {
        MindChain::from_parts(self.graph, Default::default(), self.defaults, self.now)
            .expect("fixture graph must be valid")
    }

    fn ensure(&mut self, id: NodeId) {
        if !self.graph.contains(id) {
            self.graph.insert_node(TaskNode::new(id, format!("T{id}")));
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut TaskNode {
        self.graph.node_mut(id).expect("node was just ensured")
    }
}

/// `root -> 1 -> {2, 3} -> 4`: one diamond under a top-level task.
pub fn diamond() -> GraphBuilder {
    GraphBuilder::new("diamond")
        .node(1, "Release")
        .node(2, "Write docs")
        .node(3, "Fix bugs")
        .node(4, "Tag version")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(2, 4)
        .edge(3, 4)
}

/// `root -> 1 -> 2 -> 3`: a plain sequence inside one branch.
pub fn straight_line() -> GraphBuilder {
    GraphBuilder::new("line").path(&[0, 1, 2, 3])
}
