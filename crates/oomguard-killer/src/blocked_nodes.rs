//! Kill by total reservation on blocked nodes.
//!
//! Task-level selection runs first. If it finds nothing, the reservations of
//! every query on blocked nodes are summed and the query with the largest sum
//! is killed as a whole. Only memory on blocked nodes counts: a query that is
//! large on nodes with headroom is not what is starving the cluster.

use std::collections::{BTreeMap, HashMap};

use oomguard_core::QueryId;
use oomguard_model::{KillTarget, NodeMemoryInfo, QueryMemoryInfo};
use tracing::{debug, info, warn};

use crate::killer::{largest, LowMemoryKiller};
use crate::tasks::choose_tasks_to_kill;

#[derive(Debug, Clone, Copy, Default)]
pub struct TotalReservationOnBlockedNodesKiller;

impl TotalReservationOnBlockedNodesKiller {
    fn choose_whole_query_to_kill(
        queries: &[QueryMemoryInfo],
        nodes: &[NodeMemoryInfo],
    ) -> Option<KillTarget> {
        let queries_by_id = index_by_id(queries);

        let totals: BTreeMap<&QueryId, i64> = nodes
            .iter()
            .filter_map(NodeMemoryInfo::blocked_pool)
            .flat_map(|pool| pool.query_memory_reservations.iter())
            .filter(|(query_id, _)| {
                // A task-retry query must never be killed whole. Its tasks were
                // already considered; if none showed up, the pool reports usage
                // its task listing has not caught up with yet.
                !queries_by_id
                    .get(query_id)
                    .is_some_and(|q| q.retry_policy.tolerates_task_loss())
            })
            .fold(BTreeMap::new(), |mut totals, (query_id, bytes)| {
                let total = totals.entry(query_id).or_insert(0i64);
                *total = total.saturating_add(*bytes);
                totals
            });

        for (query_id, total) in &totals {
            debug!("Query {} reserves {} bytes on blocked nodes", query_id, total);
        }

        largest(totals).map(|query_id| KillTarget::whole_query(query_id.clone()))
    }
}

impl LowMemoryKiller for TotalReservationOnBlockedNodesKiller {
    fn name(&self) -> &'static str {
        "total-reservation-on-blocked-nodes"
    }

    fn choose_target_to_kill(
        &self,
        queries: &[QueryMemoryInfo],
        nodes: &[NodeMemoryInfo],
    ) -> Option<KillTarget> {
        let target = choose_tasks_to_kill(queries, nodes)
            .or_else(|| Self::choose_whole_query_to_kill(queries, nodes));
        if let Some(target) = &target {
            info!("Low-memory killer selected {}", target);
        }
        target
    }
}

/// Index running queries by id. The first entry wins if an id repeats.
pub(crate) fn index_by_id(queries: &[QueryMemoryInfo]) -> HashMap<&QueryId, &QueryMemoryInfo> {
    let mut by_id = HashMap::with_capacity(queries.len());
    for query in queries {
        if by_id.contains_key(&query.query_id) {
            warn!("Query {} listed more than once, keeping first entry", query.query_id);
            continue;
        }
        by_id.insert(&query.query_id, query);
    }
    by_id
}
