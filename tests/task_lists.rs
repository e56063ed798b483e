// tests/task_lists.rs

mod common;
use crate::common::builders::diamond;
use crate::common::{GraphBuilder, t0};

use chrono::Duration;
use mindchain::graph::task_lists::{blocked_tasks, current_tasks};
use mindchain::render;

#[test]
fn current_tasks_are_grouped_under_their_top_level_task() {
    let graph = diamond().edge(0, 5).node(5, "Groceries").build();

    let tasks = current_tasks(&graph);

    let rows: Vec<(usize, u64, &str, Option<&str>)> = tasks
        .iter()
        .map(|t| (t.number, t.node, t.name.as_str(), t.parent.as_deref()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, 2, "Write docs", Some("Release")),
            (2, 3, "Fix bugs", Some("Release")),
            (3, 5, "Groceries", None),
        ]
    );
}

#[test]
fn nodes_with_executable_children_are_not_current() {
    let graph = diamond().build();
    assert!(current_tasks(&graph).iter().all(|t| t.node != 1));
}

#[test]
fn fully_blocked_chain_has_no_current_tasks() {
    let graph = diamond()
        .event_block(2, "a")
        .event_block(3, "b")
        .build();

    assert!(current_tasks(&graph).is_empty());
}

#[test]
fn blocked_list_holds_direct_blocks_with_their_path() {
    let until = t0() + Duration::days(1);
    let graph = diamond()
        .event_block(3, "waiting for review")
        .deadline(2, until)
        .build();

    let tasks = blocked_tasks(&graph);

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].node, 2);
    assert_eq!(tasks[0].path, "Release");
    assert_eq!(tasks[0].until, Some(until));
    assert_eq!(tasks[1].node, 3);
    assert_eq!(tasks[1].event.as_deref(), Some("waiting for review"));
    // 4 is only shadowed by the merge, which is not a direct block.
    assert!(tasks.iter().all(|t| t.node != 4));
}

#[test]
fn blocked_path_walks_up_to_level_one() {
    let graph = GraphBuilder::new("deep")
        .node(1, "Move house")
        .node(2, "Pack")
        .node(4, "Books")
        .edge(0, 1)
        .edge(1, 2)
        .edge(1, 3)
        .edge(2, 4)
        .edge(2, 5)
        .event_block(4, "boxes")
        .build();

    let tasks = blocked_tasks(&graph);

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "Books");
    assert_eq!(tasks[0].path, "Move house - Pack");
}

#[test]
fn rendered_lists_mention_every_row() {
    let graph = diamond().event_block(3, "review").build();

    let current = render::format_current(&current_tasks(&graph));
    assert!(current.contains("Write docs"));
    assert!(current.contains("Release"));

    let blocked = render::format_blocked(&blocked_tasks(&graph));
    assert!(blocked.contains("Fix bugs"));
    assert!(blocked.contains("review"));
}
