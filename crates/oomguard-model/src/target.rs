//! The remedial action chosen by a low-memory killer.

use std::collections::BTreeSet;
use std::fmt;

use oomguard_core::{QueryId, TaskId};
use serde::{Deserialize, Serialize};

/// What to terminate. Exactly one of the two shapes, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum KillTarget {
    /// Kill these tasks; their queries keep running and retry them.
    #[serde(rename_all = "camelCase")]
    SelectedTasks { tasks: BTreeSet<TaskId> },
    /// Kill the whole query.
    #[serde(rename_all = "camelCase")]
    WholeQuery { query_id: QueryId },
}

impl KillTarget {
    pub fn selected_tasks(tasks: impl IntoIterator<Item = TaskId>) -> Self {
        Self::SelectedTasks {
            tasks: tasks.into_iter().collect(),
        }
    }

    pub fn whole_query(query_id: QueryId) -> Self {
        Self::WholeQuery { query_id }
    }

    pub fn is_whole_query(&self) -> bool {
        matches!(self, Self::WholeQuery { .. })
    }

    /// Queries affected by this target, each listed once.
    pub fn affected_queries(&self) -> BTreeSet<&QueryId> {
        match self {
            Self::SelectedTasks { tasks } => tasks.iter().map(TaskId::query_id).collect(),
            Self::WholeQuery { query_id } => BTreeSet::from([query_id]),
        }
    }
}

impl fmt::Display for KillTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectedTasks { tasks } => {
                write!(f, "tasks [")?;
                for (i, task) in tasks.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", task)?;
                }
                write!(f, "]")
            }
            Self::WholeQuery { query_id } => write!(f, "query {}", query_id),
        }
    }
}
