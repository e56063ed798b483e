// src/render.rs

//! Plain-text views printed by the CLI.

use std::fmt::Write;

use crate::engine::MutationStep;
use crate::graph::task_lists::{BlockedTask, CurrentTask};
use crate::graph::{FinishedArchive, FinishedGroup, MindGraph, PriorityDefaults};

/// One line per node in id order: id, indentation by level, name and
/// derived state.
pub fn format_graph(graph: &MindGraph, defaults: &PriorityDefaults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} tasks)", graph.name(), graph.len().saturating_sub(1));

    for node in graph.task_nodes() {
        let reasons: Vec<String> = node.reasons.iter().map(ToString::to_string).collect();
        let indent = "  ".repeat(node.level as usize);
        let _ = write!(
            out,
            "{:>4} {indent}{} [{}] {{{}}} p={}",
            node.id,
            node.name,
            node.status,
            reasons.join(", "),
            defaults.effective(node),
        );
        if node.offset != 0 {
            let _ = write!(out, " dx={:+}", node.offset);
        }
        if !node.parent_ids.is_empty() {
            let parents: Vec<String> = node.parent_ids.iter().map(ToString::to_string).collect();
            let _ = write!(out, " <- {}", parents.join(","));
        }
        out.push('\n');
    }
    out
}

pub fn format_current(tasks: &[CurrentTask]) -> String {
    if tasks.is_empty() {
        return "nothing to do right now\n".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        match &task.parent {
            Some(parent) => {
                let _ = writeln!(out, "{:>3}. {} ({}) [#{}]", task.number, task.name, parent, task.node);
            }
            None => {
                let _ = writeln!(out, "{:>3}. {} [#{}]", task.number, task.name, task.node);
            }
        }
    }
    out
}

pub fn format_blocked(tasks: &[BlockedTask]) -> String {
    if tasks.is_empty() {
        return "no blocked tasks\n".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        let _ = write!(out, "{:>3}. {} [#{}]", task.number, task.name, task.node);
        if !task.path.is_empty() {
            let _ = write!(out, " in {}", task.path);
        }
        if let Some(event) = &task.event {
            let _ = write!(out, " waiting for: {event}");
        }
        if let Some(until) = &task.until {
            let _ = write!(out, " until {}", until.to_rfc3339());
        }
        out.push('\n');
    }
    out
}

pub fn format_group(group: &FinishedGroup) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "#{} finished at {} ({} nodes)",
        group.trigger,
        group.finished_at.to_rfc3339(),
        group.nodes.len()
    );
    for node in &group.nodes {
        let _ = writeln!(out, "  {:>4} {}", node.id, node.name);
    }
    out
}

pub fn format_archive(archive: &FinishedArchive) -> String {
    if archive.is_empty() {
        return "archive is empty\n".to_string();
    }
    archive.groups().iter().map(format_group).collect()
}

/// Short summary of what a mutation did.
pub fn format_step(step: &MutationStep) -> String {
    let mut parts = Vec::new();
    if let Some(id) = step.created {
        parts.push(format!("created #{id}"));
    }
    if !step.removed.is_empty() {
        parts.push(format!("archived {} node(s)", step.removed.len()));
    }
    if !step.bridged.is_empty() {
        let edges: Vec<String> = step
            .bridged
            .iter()
            .map(|e| format!("{}->{}", e.source, e.target))
            .collect();
        parts.push(format!("bridged {}", edges.join(", ")));
    }
    if !step.expired.is_empty() {
        parts.push(format!("{} deadline(s) expired", step.expired.len()));
    }
    if parts.is_empty() {
        "ok".to_string()
    } else {
        parts.join("; ")
    }
}
