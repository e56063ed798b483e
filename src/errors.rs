// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::types::NodeId;

#[derive(Error, Debug)]
pub enum MindChainError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Node not found: {0}")]
    InvalidReference(NodeId),

    #[error("Node {0} is not reachable from the root")]
    DisconnectedNode(NodeId),

    #[error("Cycle detected in graph: {0}")]
    GraphCycle(String),

    #[error("The root node cannot be mutated")]
    RootImmutable,

    #[error("Task name must not be empty")]
    EmptyName,

    #[error("Invalid block code: {0}")]
    InvalidBlockCode(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, MindChainError>;
