//! Killer trait and the no-op policy.

use oomguard_model::{KillTarget, NodeMemoryInfo, QueryMemoryInfo};

/// Trait for victim-selection policies.
pub trait LowMemoryKiller: Send + Sync {
    /// Policy name, as accepted in configuration.
    fn name(&self) -> &'static str;

    /// Choose what to kill given the running queries and every node's report.
    /// Returns `None` when no action is needed.
    fn choose_target_to_kill(
        &self,
        queries: &[QueryMemoryInfo],
        nodes: &[NodeMemoryInfo],
    ) -> Option<KillTarget>;
}

/// Policy that never kills anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneKiller;

impl LowMemoryKiller for NoneKiller {
    fn name(&self) -> &'static str {
        "none"
    }

    fn choose_target_to_kill(
        &self,
        _queries: &[QueryMemoryInfo],
        _nodes: &[NodeMemoryInfo],
    ) -> Option<KillTarget> {
        None
    }
}

/// Key with the largest positive amount; equal amounts go to the smallest key.
pub(crate) fn largest<K: Ord>(entries: impl IntoIterator<Item = (K, i64)>) -> Option<K> {
    entries
        .into_iter()
        .filter(|(_, bytes)| *bytes > 0)
        .max_by(|(ka, a), (kb, b)| a.cmp(b).then_with(|| kb.cmp(ka)))
        .map(|(key, _)| key)
}
