//! Snapshot files and decision rendering.

use std::path::Path;

use oomguard_core::Result;
use oomguard_killer::LowMemoryKiller;
use oomguard_model::{KillTarget, MemorySnapshot};
use tracing::info;

/// Load a JSON snapshot as produced by the cluster memory monitor.
pub fn load_snapshot(path: &Path) -> Result<MemorySnapshot> {
    let raw = std::fs::read_to_string(path)?;
    let snapshot: MemorySnapshot = serde_json::from_str(&raw)?;
    info!(
        "Loaded snapshot {}: {} queries, {} nodes ({} blocked)",
        path.display(),
        snapshot.queries.len(),
        snapshot.nodes.len(),
        snapshot.blocked_node_count()
    );
    Ok(snapshot)
}

pub fn decide(killer: &dyn LowMemoryKiller, snapshot: &MemorySnapshot) -> Option<KillTarget> {
    let target = killer.choose_target_to_kill(&snapshot.queries, &snapshot.nodes)?;
    info!(
        "{} would {} queries: {}",
        killer.name(),
        if target.is_whole_query() { "kill" } else { "lose tasks of" },
        affected_summary(&target)
    );
    Some(target)
}

/// Comma-separated ids of the queries a target touches.
pub fn affected_summary(target: &KillTarget) -> String {
    target
        .affected_queries()
        .iter()
        .map(|q| q.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pretty JSON for a target, `no action` otherwise.
pub fn render_decision(target: Option<&KillTarget>) -> Result<String> {
    match target {
        Some(target) => Ok(serde_json::to_string_pretty(target)?),
        None => Ok("no action".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oomguard_killer::TotalReservationOnBlockedNodesKiller;

    fn write_snapshot(dir: &tempfile::TempDir, json: &serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, serde_json::to_string(json).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_and_decide() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(
            &dir,
            &serde_json::json!({
                "queries": [
                    {"queryId": "q_1", "retryPolicy": "QUERY"},
                    {"queryId": "q_2", "retryPolicy": "TASK"}
                ],
                "nodes": [{
                    "nodeId": "n2",
                    "pool": {
                        "maxBytes": 12,
                        "reservedBytes": 13,
                        "reservedRevocableBytes": 0,
                        "queryMemoryReservations": {"q_1": 5, "q_2": 8}
                    }
                }]
            }),
        );

        let snapshot = load_snapshot(&path).unwrap();
        let target = decide(&TotalReservationOnBlockedNodesKiller, &snapshot);
        let rendered = render_decision(target.as_ref()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, serde_json::json!({"kind": "wholeQuery", "queryId": "q_1"}));
    }

    #[test]
    fn test_affected_summary() {
        let task = |q: &str, p: u32| {
            oomguard_core::TaskId::new(oomguard_core::QueryId::new(q).unwrap(), 0, p, 0)
        };
        let target = KillTarget::selected_tasks([task("q_2", 6), task("q_1", 1), task("q_2", 3)]);
        assert_eq!(affected_summary(&target), "q_1, q_2");

        let target = KillTarget::whole_query(oomguard_core::QueryId::new("q_7").unwrap());
        assert_eq!(affected_summary(&target), "q_7");
    }

    #[test]
    fn test_no_action_rendering() {
        assert_eq!(render_decision(None).unwrap(), "no action");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, oomguard_core::Error::Io(_)));
    }

    #[test]
    fn test_malformed_task_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(
            &dir,
            &serde_json::json!({
                "nodes": [{
                    "nodeId": "n1",
                    "pool": {
                        "maxBytes": 1,
                        "reservedBytes": 1,
                        "reservedRevocableBytes": 0,
                        "taskMemoryReservations": {"garbage": 1}
                    }
                }]
            }),
        );
        let err = load_snapshot(&path).unwrap_err();
        assert!(matches!(err, oomguard_core::Error::Json(_)));
    }
}
