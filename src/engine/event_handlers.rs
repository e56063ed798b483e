// src/engine/event_handlers.rs

//! Event handling logic for the core engine.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::engine::chain::{MindChain, MutationStep};
use crate::engine::Mutation;
use crate::store::Snapshot;
use crate::types::NodeId;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Write this snapshot to the store.
    Persist(Snapshot),
    /// These nodes changed level, status or offset and need redrawing.
    Relayout(Vec<NodeId>),
    /// A mutation was refused; the chain is unchanged.
    Reject { mutation: Mutation, error: String },
    /// Request that the process exits.
    RequestExit,
}

/// Decision returned by the core after handling a single `EngineEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute (persist, redraw, exit).
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

fn relayout_commands(step: &MutationStep) -> Vec<CoreCommand> {
    let mut ids = step.relayout.clone();
    ids.extend(step.removed.iter().copied());
    if ids.is_empty() {
        Vec::new()
    } else {
        vec![CoreCommand::Relayout(ids)]
    }
}

/// Apply a user mutation.
///
/// A refused mutation produces a `Reject` command and leaves `dirty` alone.
pub fn handle_mutation(
    chain: &mut MindChain,
    dirty: &mut bool,
    mutation: Mutation,
    now: DateTime<Utc>,
) -> CoreStep {
    match chain.apply(&mutation, now) {
        Ok(step) => {
            *dirty = true;
            debug!(?mutation, created = ?step.created, removed = step.removed.len(), "mutation applied");
            CoreStep::running(relayout_commands(&step))
        }
        Err(err) => {
            warn!(?mutation, error = %err, "mutation rejected");
            CoreStep::running(vec![CoreCommand::Reject {
                mutation,
                error: err.to_string(),
            }])
        }
    }
}

/// Periodic deadline sweep: clear expired `blocked_until` fields.
pub fn handle_deadline_tick(chain: &mut MindChain, dirty: &mut bool, now: DateTime<Utc>) -> CoreStep {
    match chain.sweep_deadlines(now) {
        Ok(step) if step.expired.is_empty() => CoreStep::running(Vec::new()),
        Ok(step) => {
            *dirty = true;
            info!(expired = ?step.expired, "deadline sweep unblocked nodes");
            CoreStep::running(relayout_commands(&step))
        }
        Err(err) => {
            warn!(error = %err, "deadline sweep failed; graph left unchanged");
            CoreStep::running(Vec::new())
        }
    }
}

/// Periodic auto-save: persist only if something changed since the last save.
pub fn handle_autosave_tick(chain: &MindChain, dirty: &mut bool) -> CoreStep {
    if !*dirty {
        debug!("autosave skipped; nothing changed");
        return CoreStep::running(Vec::new());
    }
    *dirty = false;
    info!("autosave");
    CoreStep::running(vec![CoreCommand::Persist(Snapshot::capture(
        chain.graph(),
        chain.archive(),
    ))])
}

/// A save did not reach the store: mark the chain dirty again so the next
/// autosave or the shutdown retries it.
pub fn handle_persist_failed(dirty: &mut bool) -> CoreStep {
    *dirty = true;
    CoreStep::running(Vec::new())
}

/// Shutdown: flush pending changes and stop.
pub fn handle_shutdown(chain: &MindChain, dirty: &mut bool) -> CoreStep {
    let mut commands = Vec::new();
    if *dirty {
        *dirty = false;
        commands.push(CoreCommand::Persist(Snapshot::capture(
            chain.graph(),
            chain.archive(),
        )));
    }
    commands.push(CoreCommand::RequestExit);
    CoreStep {
        commands,
        keep_running: false,
    }
}
