// src/store/mod.rs

//! Snapshot persistence.
//!
//! The runtime talks to a `SnapshotStore` instead of a concrete file. This
//! makes it easy to swap in a recording store in tests while keeping the
//! production JSON backend in [`json`].

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

pub mod json;
pub mod record;

pub use json::JsonFileStore;
pub use record::{NodeRecord, Snapshot};

/// Trait abstracting where snapshots go.
pub trait SnapshotStore: Send {
    /// Persist a snapshot, replacing the previous one.
    fn save(&mut self, snapshot: Snapshot) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Load the last saved snapshot, `None` if nothing was saved yet.
    fn load(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<Snapshot>>> + Send + '_>>;
}
