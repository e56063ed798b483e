// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::engine::chain::MindChain;
use crate::errors::Result;
use crate::store::{Snapshot, SnapshotStore};

use super::clock::Clock;
use super::core::CoreEngine;
use super::{CoreCommand, EngineEvent};

/// Periods of the two background sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub autosave_interval: Duration,
    pub deadline_interval: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(30 * 60),
            deadline_interval: Duration::from_secs(30),
        }
    }
}

/// Drives the core engine in response to user events and timer ticks, and
/// delegates persistence to a `SnapshotStore`.
///
/// This is a pure IO shell around `CoreEngine`, which contains all the
/// mutation semantics. This struct handles async IO: reading events from
/// the channel, ticking timers and writing snapshots.
pub struct Runtime<S: SnapshotStore, C: Clock> {
    core: CoreEngine,
    event_rx: mpsc::Receiver<EngineEvent>,
    store: S,
    clock: C,
    timers: TimerSettings,
}

impl<S: SnapshotStore, C: Clock> fmt::Debug for Runtime<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}

impl<S: SnapshotStore, C: Clock> Runtime<S, C> {
    pub fn new(
        core: CoreEngine,
        event_rx: mpsc::Receiver<EngineEvent>,
        store: S,
        clock: C,
        timers: TimerSettings,
    ) -> Self {
        Self {
            core,
            event_rx,
            store,
            clock,
            timers,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `EngineEvent`s from `event_rx`.
    /// - Turns timer ticks into `DeadlineTick` / `AutosaveTick` events.
    /// - Feeds everything into the core and executes the returned commands.
    ///
    /// When the channel closes the loop behaves as if shutdown had been
    /// requested, so pending changes are still saved. Store failures never
    /// stop the loop. Returns the final chain.
    pub async fn run(mut self) -> Result<MindChain> {
        info!(
            autosave = ?self.timers.autosave_interval,
            deadline = ?self.timers.deadline_interval,
            "mindchain runtime started"
        );

        let start = Instant::now();
        let mut deadline_timer = interval_at(
            start + self.timers.deadline_interval,
            self.timers.deadline_interval,
        );
        deadline_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut autosave_timer = interval_at(
            start + self.timers.autosave_interval,
            self.timers.autosave_interval,
        );
        autosave_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                received = self.event_rx.recv() => match received {
                    Some(event) => event,
                    None => {
                        info!("runtime event channel closed; shutting down");
                        EngineEvent::ShutdownRequested
                    }
                },
                _ = deadline_timer.tick() => EngineEvent::DeadlineTick,
                _ = autosave_timer.tick() => EngineEvent::AutosaveTick,
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event, self.clock.now());

            for command in step.commands {
                self.execute_command(command).await;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        if self.core.is_dirty() {
            warn!("runtime exiting with unsaved changes");
        } else {
            info!("runtime exiting");
        }
        Ok(self.core.into_chain())
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::Persist(snapshot) => self.persist(snapshot).await,
            CoreCommand::Relayout(ids) => {
                debug!(?ids, "nodes need relayout");
            }
            CoreCommand::Reject { mutation, error } => {
                warn!(?mutation, %error, "mutation rejected");
            }
            CoreCommand::RequestExit => {
                // keep_running=false already stops the loop.
                info!("core issued RequestExit command");
            }
        }
    }

    /// Save a snapshot. A failed save is logged and handed back to the core
    /// so the changes stay pending; the loop keeps running.
    async fn persist(&mut self, snapshot: Snapshot) {
        debug!(nodes = snapshot.nodes.len(), "persisting snapshot");
        if let Err(err) = self.store.save(snapshot).await {
            warn!(error = %err, "failed to save snapshot; will retry");
            self.core.step(EngineEvent::PersistFailed, self.clock.now());
        }
    }
}
