use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mindchain::errors::{MindChainError, Result};
use mindchain::store::{Snapshot, SnapshotStore};

/// A fake store that:
/// - records every snapshot it is asked to save
/// - serves the most recent one (or a seeded one) on load
/// - can be switched into failing every save, like a full disk.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    saved: Arc<Mutex<Vec<Snapshot>>>,
    failing: Arc<AtomicBool>,
    failed_saves: Arc<AtomicUsize>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded snapshots, readable after the store has
    /// been moved into a runtime.
    pub fn saved(&self) -> Arc<Mutex<Vec<Snapshot>>> {
        Arc::clone(&self.saved)
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    /// Make every following save fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn failed_saves(&self) -> usize {
        self.failed_saves.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for RecordingStore {
    fn save(&mut self, snapshot: Snapshot) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let saved = Arc::clone(&self.saved);
        let failing = self.failing.load(Ordering::SeqCst);
        let failed_saves = Arc::clone(&self.failed_saves);
        Box::pin(async move {
            if failing {
                failed_saves.fetch_add(1, Ordering::SeqCst);
                return Err(MindChainError::IoError(std::io::Error::other("disk full")));
            }
            saved.lock().unwrap().push(snapshot);
            Ok(())
        })
    }

    fn load(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<Snapshot>>> + Send + '_>> {
        let saved = Arc::clone(&self.saved);
        Box::pin(async move { Ok(saved.lock().unwrap().last().cloned()) })
    }
}
