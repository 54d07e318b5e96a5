//! Per-node pool status and per-query identity as reported each polling cycle.

use std::collections::HashMap;

use oomguard_core::{QueryId, TaskId};
use serde::{Deserialize, Serialize};

/// How the engine recovers when one of a query's tasks fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetryPolicy {
    /// Any failure fails the query for good.
    #[default]
    None,
    /// Any task failure restarts the whole query.
    Query,
    /// Failed tasks are retried individually; the query keeps running.
    Task,
}

impl RetryPolicy {
    /// Whether losing a single task is recoverable without restarting the query.
    pub fn tolerates_task_loss(&self) -> bool {
        matches!(self, Self::Task)
    }
}

/// State of the shared memory pool on one worker node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryPoolInfo {
    pub max_bytes: i64,
    pub reserved_bytes: i64,
    /// Bytes reserved but reclaimable under pressure (e.g. by spilling).
    pub reserved_revocable_bytes: i64,
    /// Bytes per query, summed over that query's tasks on this node.
    #[serde(default)]
    pub query_memory_reservations: HashMap<QueryId, i64>,
    /// Carried through from the monitor; no policy reads it yet.
    #[serde(default)]
    pub query_memory_revocable_reservations: HashMap<QueryId, i64>,
    #[serde(default)]
    pub task_memory_reservations: HashMap<TaskId, i64>,
    /// Carried through from the monitor; no policy reads it yet.
    #[serde(default)]
    pub task_memory_revocable_reservations: HashMap<TaskId, i64>,
}

impl MemoryPoolInfo {
    pub fn new(max_bytes: i64, reserved_bytes: i64, reserved_revocable_bytes: i64) -> Self {
        Self {
            max_bytes,
            reserved_bytes,
            reserved_revocable_bytes,
            ..Default::default()
        }
    }

    pub fn with_query_reservation(mut self, query_id: QueryId, bytes: i64) -> Self {
        self.query_memory_reservations.insert(query_id, bytes);
        self
    }

    pub fn with_task_reservation(mut self, task_id: TaskId, bytes: i64) -> Self {
        self.task_memory_reservations.insert(task_id, bytes);
        self
    }

    /// Bytes not reserved by anyone.
    pub fn free_bytes(&self) -> i64 {
        self.max_bytes.saturating_sub(self.reserved_bytes)
    }

    /// A pool is blocked once neither free nor revocable capacity is left.
    pub fn is_blocked(&self) -> bool {
        self.free_bytes().saturating_add(self.reserved_revocable_bytes) <= 0
    }
}

/// What one worker node reported this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMemoryInfo {
    pub node_id: String,
    /// Informational, carried through from the node report.
    #[serde(default)]
    pub available_processors: u32,
    /// `None` when the node sent no pool data; not an error.
    #[serde(default)]
    pub pool: Option<MemoryPoolInfo>,
}

impl NodeMemoryInfo {
    pub fn new(node_id: impl Into<String>, pool: Option<MemoryPoolInfo>) -> Self {
        Self {
            node_id: node_id.into(),
            available_processors: 0,
            pool,
        }
    }

    /// The node's pool, if it reported one and that pool is blocked.
    pub fn blocked_pool(&self) -> Option<&MemoryPoolInfo> {
        self.pool.as_ref().filter(|pool| pool.is_blocked())
    }
}

/// A query the coordinator considers running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMemoryInfo {
    pub query_id: QueryId,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    /// Cluster-wide total reservation as tracked by the coordinator.
    #[serde(default)]
    pub memory_reservation: i64,
}

impl QueryMemoryInfo {
    pub fn new(query_id: QueryId, retry_policy: RetryPolicy, memory_reservation: i64) -> Self {
        Self {
            query_id,
            retry_policy,
            memory_reservation,
        }
    }
}

/// Everything one decision cycle needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    #[serde(default)]
    pub queries: Vec<QueryMemoryInfo>,
    #[serde(default)]
    pub nodes: Vec<NodeMemoryInfo>,
}

impl MemorySnapshot {
    pub fn blocked_node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.blocked_pool().is_some()).count()
    }
}
