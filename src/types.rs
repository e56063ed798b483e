// src/types.rs

//! Small shared vocabulary types: node ids, status, reason tags, block codes
//! and priority directions.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::MindChainError;

/// Stable node identifier. Ids are unique but not required to be contiguous.
pub type NodeId = u64;

/// Id of the synthetic root node (the note itself).
pub const ROOT_ID: NodeId = 0;

/// Execution status of a node.
///
/// A finished node is removed from the active graph, so there is no
/// `Finished` variant here.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Executable,
    Blocked,
}

impl Status {
    /// Sort rank used by the sibling orderer: Executable before Blocked.
    pub fn rank(self) -> u8 {
        match self {
            Status::Executable => 0,
            Status::Blocked => 1,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Executable => f.write_str("executable"),
            Status::Blocked => f.write_str("blocked"),
        }
    }
}

/// One element of a node's reason set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Leaf node that can be worked on right now.
    SelfExecutable,
    /// At least one direct child is executable.
    HasExecutableChild,
    /// Manually blocked waiting on an external event.
    EventBlocked,
    /// Manually blocked until a deadline.
    TimeBlocked,
    /// The node sits at a convergence point whose upstream branch is unfinished.
    ConvergenceBelow,
    /// The sole direct parent is blocked.
    ParentBlocked,
    /// Every direct child is blocked.
    AllChildrenBlocked,
}

impl Reason {
    /// Whether this tag forces the node into `Status::Blocked`.
    pub fn is_blocking(self) -> bool {
        !matches!(self, Reason::SelfExecutable | Reason::HasExecutableChild)
    }

    /// Reasons coming from the node's own manual fields.
    pub fn is_direct(self) -> bool {
        matches!(self, Reason::EventBlocked | Reason::TimeBlocked)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Reason::SelfExecutable => "self_executable",
            Reason::HasExecutableChild => "has_executable_child",
            Reason::EventBlocked => "event_blocked",
            Reason::TimeBlocked => "time_blocked",
            Reason::ConvergenceBelow => "convergence_below",
            Reason::ParentBlocked => "parent_blocked",
            Reason::AllChildrenBlocked => "all_children_blocked",
        };
        f.write_str(s)
    }
}

/// Set semantics for reasons; the persisted list can never hold duplicates.
pub type ReasonSet = BTreeSet<Reason>;

/// Status implied by a reason set.
pub fn status_for(reasons: &ReasonSet) -> Status {
    if reasons.iter().any(|r| r.is_blocking()) {
        Status::Blocked
    } else {
        Status::Executable
    }
}

/// Code passed to the Block operator.
///
/// Textual forms:
/// - `event:<description>` blocks on an external event.
/// - `until:<rfc3339 timestamp>` blocks until a deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockCode {
    Event(String),
    Until(DateTime<Utc>),
}

impl FromStr for BlockCode {
    type Err = MindChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = MindChainError::InvalidBlockCode;
        let (kind, value) = s.split_once(':').ok_or_else(|| {
            invalid(format!("'{s}' (expected event:<text> or until:<time>)"))
        })?;
        let value = value.trim();

        match kind.trim().to_lowercase().as_str() {
            "event" => {
                if value.is_empty() {
                    return Err(invalid("event block code needs a description".to_string()));
                }
                Ok(BlockCode::Event(value.to_string()))
            }
            "until" | "time" => DateTime::parse_from_rfc3339(value)
                .map(|t| BlockCode::Until(t.with_timezone(&Utc)))
                .map_err(|e| invalid(format!("invalid deadline '{value}': {e}"))),
            other => Err(invalid(format!(
                "unknown block code kind '{other}' (expected \"event\" or \"until\")"
            ))),
        }
    }
}

/// Direction for the Change-Priority operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityDirection {
    Up,
    Down,
}

impl FromStr for PriorityDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "+" => Ok(PriorityDirection::Up),
            "down" | "-" => Ok(PriorityDirection::Down),
            other => Err(format!(
                "invalid priority direction: {other} (expected \"up\" or \"down\")"
            )),
        }
    }
}
