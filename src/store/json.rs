// src/store/json.rs

//! JSON file backend for snapshots.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::{Snapshot, SnapshotStore};

/// Stores the snapshot as pretty-printed JSON at a fixed path.
///
/// Writes go to a sibling `.tmp` file first and are then renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore<F: FileSystem = RealFileSystem> {
    fs: F,
    path: PathBuf,
}

impl JsonFileStore<RealFileSystem> {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(RealFileSystem, path)
    }
}

impl<F: FileSystem> JsonFileStore<F> {
    pub fn with_fs(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.fs.is_file(&self.path)
    }

    pub fn read_snapshot(&self) -> Result<Option<Snapshot>> {
        if !self.fs.exists(&self.path) {
            debug!(path = ?self.path, "no snapshot file yet");
            return Ok(None);
        }
        let contents = self.fs.read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        debug!(path = ?self.path, nodes = snapshot.nodes.len(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    pub fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.tmp_path();
        self.fs.write(&tmp, json.as_bytes())?;
        self.fs.rename(&tmp, &self.path)?;
        info!(path = ?self.path, nodes = snapshot.nodes.len(), "snapshot saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<F: FileSystem + 'static> SnapshotStore for JsonFileStore<F> {
    fn save(&mut self, snapshot: Snapshot) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { self.write_snapshot(&snapshot) })
    }

    fn load(&mut self) -> Pin<Box<dyn Future<Output = Result<Option<Snapshot>>> + Send + '_>> {
        Box::pin(async move { self.read_snapshot() })
    }
}
