// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::TimerSettings;
use crate::graph::PriorityDefaults;

/// Top-level configuration as read from `MindChain.toml`.
///
/// ```toml
/// [store]
/// path = "mindchain.json"
///
/// [timers]
/// autosave_interval = "30m"
/// deadline_interval = "30s"
///
/// [priority]
/// executable_default = 100
/// blocked_default = 50
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub timers: RawTimersSection,

    #[serde(default)]
    pub priority: PriorityDefaults,
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Snapshot file, relative to the working directory.
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "mindchain.json".to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// `[timers]` section, durations still in their textual `<n><unit>` form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTimersSection {
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: String,

    #[serde(default = "default_deadline_interval")]
    pub deadline_interval: String,
}

fn default_autosave_interval() -> String {
    "30m".to_string()
}

fn default_deadline_interval() -> String {
    "30s".to_string()
}

impl Default for RawTimersSection {
    fn default() -> Self {
        Self {
            autosave_interval: default_autosave_interval(),
            deadline_interval: default_deadline_interval(),
        }
    }
}

/// Validated configuration. Built from [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub store_path: PathBuf,
    pub timers: TimerSettings,
    pub priority: PriorityDefaults,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        store_path: PathBuf,
        timers: TimerSettings,
        priority: PriorityDefaults,
    ) -> Self {
        Self {
            store_path,
            timers,
            priority,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            PathBuf::from(default_store_path()),
            TimerSettings::default(),
            PriorityDefaults::default(),
        )
    }
}
