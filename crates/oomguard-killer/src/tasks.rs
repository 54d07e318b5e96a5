//! Task-level selection: pick single tasks of task-retry queries on blocked nodes.
//!
//! Killing a task only throws away that task's partial work, so every policy
//! that supports it runs this phase first and only falls back to killing a
//! whole query when nothing here qualifies.

use std::collections::{BTreeSet, HashSet};

use oomguard_core::{QueryId, TaskId};
use oomguard_model::{KillTarget, NodeMemoryInfo, QueryMemoryInfo};
use tracing::debug;

use crate::killer::largest;

/// Choose at most one task per blocked node: the task with the largest
/// reservation among tasks whose query retries at task granularity.
///
/// Tasks of queries missing from `queries` are ignored. Returns `None` when
/// no blocked node hosts an eligible task.
pub fn choose_tasks_to_kill(
    queries: &[QueryMemoryInfo],
    nodes: &[NodeMemoryInfo],
) -> Option<KillTarget> {
    let task_retry_queries: HashSet<&QueryId> = queries
        .iter()
        .filter(|q| q.retry_policy.tolerates_task_loss())
        .map(|q| &q.query_id)
        .collect();

    if task_retry_queries.is_empty() {
        return None;
    }

    let mut tasks_to_kill: BTreeSet<TaskId> = BTreeSet::new();
    for node in nodes {
        let Some(pool) = node.blocked_pool() else {
            continue;
        };

        let candidates = pool
            .task_memory_reservations
            .iter()
            .filter(|(task, _)| task_retry_queries.contains(task.query_id()))
            .map(|(task, bytes)| (task, *bytes));

        if let Some(task) = largest(candidates) {
            debug!("Node {} is blocked, picked task {}", node.node_id, task);
            tasks_to_kill.insert(task.clone());
        } else {
            debug!("Node {} is blocked but hosts no task-retry task", node.node_id);
        }
    }

    if tasks_to_kill.is_empty() {
        return None;
    }
    Some(KillTarget::SelectedTasks {
        tasks: tasks_to_kill,
    })
}
