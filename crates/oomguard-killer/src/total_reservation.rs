//! Kill by cluster-wide total reservation.

use oomguard_model::{KillTarget, NodeMemoryInfo, QueryMemoryInfo};
use tracing::{debug, info};

use crate::blocked_nodes::index_by_id;
use crate::killer::{largest, LowMemoryKiller};
use crate::tasks::choose_tasks_to_kill;

/// Same task phase as [`TotalReservationOnBlockedNodesKiller`], but the
/// fallback kills the query with the largest coordinator-tracked reservation,
/// wherever that memory lives. Acts only while some node is blocked.
///
/// [`TotalReservationOnBlockedNodesKiller`]: crate::TotalReservationOnBlockedNodesKiller
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalReservationKiller;

impl LowMemoryKiller for TotalReservationKiller {
    fn name(&self) -> &'static str {
        "total-reservation"
    }

    fn choose_target_to_kill(
        &self,
        queries: &[QueryMemoryInfo],
        nodes: &[NodeMemoryInfo],
    ) -> Option<KillTarget> {
        if !nodes.iter().any(|node| node.blocked_pool().is_some()) {
            debug!("No blocked nodes, nothing to kill");
            return None;
        }

        let target = choose_tasks_to_kill(queries, nodes).or_else(|| {
            let candidates = index_by_id(queries)
                .into_values()
                .filter(|q| !q.retry_policy.tolerates_task_loss())
                .map(|q| (&q.query_id, q.memory_reservation));
            largest(candidates).map(|query_id| KillTarget::whole_query(query_id.clone()))
        });
        if let Some(target) = &target {
            info!("Low-memory killer selected {}", target);
        }
        target
    }
}
