// src/engine/mod.rs

//! Mutation engine for mindchain.
//!
//! This module ties together:
//! - the structural operators (finish, block, add sibling/child, priority)
//! - [`MindChain`], which applies an operator and recomputes the graph as one
//!   all-or-nothing step
//! - the main runtime event loop that reacts to:
//!   - user mutations
//!   - the periodic deadline sweep
//!   - the periodic autosave
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::{BlockCode, NodeId, PriorityDirection};

/// Name given to nodes created without an explicit name.
pub const DEFAULT_TASK_NAME: &str = "New task";

/// A user-initiated change to the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Finish(NodeId),
    Block { node: NodeId, code: BlockCode },
    Unblock(NodeId),
    AddSibling { node: NodeId, name: Option<String> },
    AddChild { node: NodeId, name: Option<String> },
    ChangePriority { node: NodeId, direction: PriorityDirection },
    Rename { node: NodeId, name: String },
    SetContext { node: NodeId, context: Option<String> },
}

impl Mutation {
    /// The node the mutation is aimed at.
    pub fn target(&self) -> NodeId {
        match self {
            Mutation::Finish(node) | Mutation::Unblock(node) => *node,
            Mutation::Block { node, .. }
            | Mutation::AddSibling { node, .. }
            | Mutation::AddChild { node, .. }
            | Mutation::ChangePriority { node, .. }
            | Mutation::Rename { node, .. }
            | Mutation::SetContext { node, .. } => *node,
        }
    }
}

/// Events flowing into the runtime from the user and the timers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Mutate(Mutation),
    /// The deadline sweep timer fired.
    DeadlineTick,
    /// The autosave timer fired.
    AutosaveTick,
    /// The store refused the last `Persist`; its changes are still unsaved.
    PersistFailed,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod chain;
pub mod clock;
pub mod core;
pub mod event_handlers;
pub mod operators;
pub mod runtime;

pub use chain::{MindChain, MutationStep};
pub use clock::{Clock, FixedClock, SystemClock};
pub use core::CoreEngine;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::{Runtime, TimerSettings};
