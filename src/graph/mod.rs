// src/graph/mod.rs

//! Graph state engine.
//!
//! - [`model`] holds the node/edge store and the per-node manual fields.
//! - [`index`] builds a fresh adjacency index (petgraph) for every pass and
//!   validates structure.
//! - [`levels`] assigns branch depth.
//! - [`convergence`] locates the node where diverging paths remerge.
//! - [`status`] derives status and reason sets through a fixed rule pipeline.
//! - [`ordering`] sorts siblings by status and priority into x-offsets.
//! - [`archive`] keeps finished spans.
//! - [`task_lists`] builds the current / blocked task views.
//!
//! [`recompute`] composes the passes into the single entry point invoked
//! after every mutation.

pub mod archive;
pub mod convergence;
pub mod index;
pub mod levels;
pub mod model;
pub mod ordering;
pub mod status;
pub mod task_lists;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::Result;

pub use archive::{FinishedArchive, FinishedGroup};
pub use convergence::{find_convergence, span_until};
pub use index::GraphIndex;
pub use model::{Edge, MindGraph, TaskNode};
pub use ordering::{PriorityDefaults, SiblingOrder};

/// Recompute levels, parent ids, status/reasons and sibling offsets.
///
/// Pure: the input graph is left untouched and a new snapshot is returned.
pub fn recompute(
    graph: &MindGraph,
    now: DateTime<Utc>,
    defaults: &PriorityDefaults,
) -> Result<MindGraph> {
    let mut next = graph.clone();
    recompute_in_place(&mut next, now, defaults)?;
    Ok(next)
}

/// In-place variant of [`recompute`] used by the mutation operators.
pub fn recompute_in_place(
    graph: &mut MindGraph,
    now: DateTime<Utc>,
    defaults: &PriorityDefaults,
) -> Result<()> {
    index::validate(graph)?;
    let index = GraphIndex::build(graph);
    let order = index.topo_order()?;

    levels::assign_levels(graph, &index, &order);
    graph.refresh_parent_ids(&index);
    status::apply_status(graph, &index, &order, now);
    ordering::apply_order(graph, &index, &order, defaults);

    debug!(
        nodes = graph.len(),
        edges = graph.edges().len(),
        "graph recomputed"
    );
    Ok(())
}

/// Re-run only the sibling orderer (priority changes do not affect levels
/// or status).
pub fn reorder_in_place(graph: &mut MindGraph, defaults: &PriorityDefaults) -> Result<()> {
    let index = GraphIndex::build(graph);
    let order = index.topo_order()?;
    ordering::apply_order(graph, &index, &order, defaults);
    Ok(())
}
