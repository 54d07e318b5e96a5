//! Fixture builders shared by the killer integration tests.
//!
//! Tables are written as `query -> [(node, bytes)]` and, for tasks,
//! `query -> [(node, [(partition, bytes)])]`. Every node gets a pool of the
//! same capacity whose reserved bytes are the sum of query reservations on it.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use oomguard_core::{QueryId, TaskId};
use oomguard_model::{MemoryPoolInfo, NodeMemoryInfo, QueryMemoryInfo, RetryPolicy};

pub type QueryTable<'a> = &'a [(&'a str, &'a [(&'a str, i64)])];
pub type TaskTable<'a> = &'a [(&'a str, &'a [(&'a str, &'a [(u32, i64)])])];

pub fn query_id(id: &str) -> QueryId {
    QueryId::new(id).expect("valid query id")
}

pub fn task_id(query: &str, partition: u32) -> TaskId {
    TaskId::new(query_id(query), 0, partition, 0)
}

/// Running queries; those named in `task_retry` use the TASK retry policy.
pub fn to_query_memory_info_list(queries: QueryTable, task_retry: &[&str]) -> Vec<QueryMemoryInfo> {
    queries
        .iter()
        .map(|(query, per_node)| {
            let retry_policy = if task_retry.contains(query) {
                RetryPolicy::Task
            } else {
                RetryPolicy::None
            };
            let total: i64 = per_node.iter().map(|(_, bytes)| bytes).sum();
            QueryMemoryInfo::new(query_id(query), retry_policy, total)
        })
        .collect()
}

pub fn to_node_memory_info_list(
    max_bytes: i64,
    queries: QueryTable,
    tasks: TaskTable,
) -> Vec<NodeMemoryInfo> {
    let node_ids: BTreeSet<&str> = queries
        .iter()
        .flat_map(|(_, per_node)| per_node.iter().map(|(node, _)| *node))
        .chain(
            tasks
                .iter()
                .flat_map(|(_, per_node)| per_node.iter().map(|(node, _)| *node)),
        )
        .collect();

    let mut pools: BTreeMap<&str, MemoryPoolInfo> = node_ids
        .into_iter()
        .map(|node| (node, MemoryPoolInfo::new(max_bytes, 0, 0)))
        .collect();

    for (query, per_node) in queries {
        for (node, bytes) in per_node.iter() {
            if let Some(pool) = pools.get_mut(node) {
                pool.reserved_bytes += bytes;
                pool.query_memory_reservations.insert(query_id(query), *bytes);
            }
        }
    }

    for (query, per_node) in tasks {
        for (node, per_task) in per_node.iter() {
            if let Some(pool) = pools.get_mut(node) {
                for (partition, bytes) in per_task.iter() {
                    pool.task_memory_reservations
                        .insert(task_id(query, *partition), *bytes);
                }
            }
        }
    }

    pools
        .into_iter()
        .map(|(node, pool)| NodeMemoryInfo::new(node, Some(pool)))
        .collect()
}
