// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::{BlockCode, NodeId, PriorityDirection};

/// Command-line arguments for `mindchain`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mindchain",
    version,
    about = "Track branching task chains: what can be done now and what is waiting.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `MindChain.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Snapshot file to use instead of `[store].path`.
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MINDCHAIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a new, empty chain.
    Init {
        /// Note name stored on the root.
        name: String,
        /// Overwrite an existing snapshot.
        #[arg(long)]
        force: bool,
    },
    /// Print every node with its level, status and reasons.
    Show,
    /// Add a task one level below a node (use 0 for a top-level task).
    AddChild {
        id: NodeId,
        #[arg(long)]
        name: Option<String>,
    },
    /// Add a task next to a node.
    AddSibling {
        id: NodeId,
        #[arg(long)]
        name: Option<String>,
    },
    /// Mark a node finished and archive its span.
    Finish { id: NodeId },
    /// Block a node: `event:<description>` or `until:<rfc3339 time>`.
    Block {
        id: NodeId,
        #[arg(value_parser = parse_block_code)]
        code: BlockCode,
    },
    /// Clear both manual blocks.
    Unblock { id: NodeId },
    /// Move a node up or down among its siblings.
    Priority {
        id: NodeId,
        #[arg(value_parser = parse_direction)]
        direction: PriorityDirection,
    },
    Rename { id: NodeId, name: String },
    /// Set (or clear, with an empty string) a node's context note.
    Context { id: NodeId, text: String },
    /// List what can be worked on right now.
    Tasks,
    /// List directly blocked tasks.
    Blocked,
    /// Show the finished archive, or one finished group.
    Archive { id: Option<NodeId> },
    /// Keep running: sweep deadlines and autosave until Ctrl-C.
    Watch,
}

fn parse_block_code(s: &str) -> Result<BlockCode, String> {
    s.parse().map_err(|e: crate::errors::MindChainError| e.to_string())
}

fn parse_direction(s: &str) -> Result<PriorityDirection, String> {
    s.parse()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
