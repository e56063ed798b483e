// src/engine/core.rs

//! Pure core engine state machine.
//!
//! This module contains a synchronous, deterministic "core engine" that
//! consumes [`EngineEvent`]s and produces:
//! - an updated chain
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - ticking the deadline and autosave timers
//! - writing snapshots to the store
//! - handling Ctrl+C / shutdown
//!
//! The core takes the current time as an argument, so it can be unit tested
//! without any Tokio, channels, filesystem, or clocks.

use chrono::{DateTime, Utc};

use crate::engine::chain::MindChain;
use crate::engine::event_handlers::{
    CoreStep, handle_autosave_tick, handle_deadline_tick, handle_mutation, handle_persist_failed,
    handle_shutdown,
};
use crate::engine::EngineEvent;

#[derive(Debug)]
pub struct CoreEngine {
    chain: MindChain,
    /// Whether the chain changed since the last `Persist` command.
    dirty: bool,
}

impl CoreEngine {
    pub fn new(chain: MindChain) -> Self {
        Self { chain, dirty: false }
    }

    pub fn chain(&self) -> &MindChain {
        &self.chain
    }

    pub fn into_chain(self) -> MindChain {
        self.chain
    }

    /// Expose unsaved-changes state (for tests).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Handle a single event, updating the chain and returning the resulting
    /// commands for the IO shell.
    pub fn step(&mut self, event: EngineEvent, now: DateTime<Utc>) -> CoreStep {
        match event {
            EngineEvent::Mutate(mutation) => {
                handle_mutation(&mut self.chain, &mut self.dirty, mutation, now)
            }
            EngineEvent::DeadlineTick => handle_deadline_tick(&mut self.chain, &mut self.dirty, now),
            EngineEvent::AutosaveTick => handle_autosave_tick(&self.chain, &mut self.dirty),
            EngineEvent::PersistFailed => handle_persist_failed(&mut self.dirty),
            EngineEvent::ShutdownRequested => handle_shutdown(&self.chain, &mut self.dirty),
        }
    }
}
