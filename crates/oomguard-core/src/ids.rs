//! Typed identifiers for queries and the tasks they schedule onto nodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cluster-unique query identifier.
///
/// Restricted to ASCII alphanumerics, `_` and `-` so that it can be embedded
/// in the dotted [`TaskId`] text form without ambiguity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QueryId(String);

impl QueryId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidQueryId("query id is empty".into()));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(Error::InvalidQueryId(format!(
                "unexpected character {:?} in {:?}",
                c, id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for QueryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for QueryId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<QueryId> for String {
    fn from(id: QueryId) -> Self {
        id.0
    }
}

/// One unit of parallel work of a query, scheduled onto a single node.
///
/// The text form is `<query>.<stage>.<partition>.<attempt>`, e.g.
/// `q_2.0.3.0`. Ordering compares the owning query first, which keeps the
/// tasks of one query adjacent in ordered collections.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId {
    query_id: QueryId,
    stage_id: u32,
    partition_id: u32,
    attempt_id: u32,
}

impl TaskId {
    pub fn new(query_id: QueryId, stage_id: u32, partition_id: u32, attempt_id: u32) -> Self {
        Self {
            query_id,
            stage_id,
            partition_id,
            attempt_id,
        }
    }

    /// The query that issued this task.
    pub fn query_id(&self) -> &QueryId {
        &self.query_id
    }

    pub fn stage_id(&self) -> u32 {
        self.stage_id
    }

    pub fn partition_id(&self) -> u32 {
        self.partition_id
    }

    pub fn attempt_id(&self) -> u32 {
        self.attempt_id
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.query_id, self.stage_id, self.partition_id, self.attempt_id
        )
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(Error::InvalidTaskId(format!(
                "expected <query>.<stage>.<partition>.<attempt>, got {:?}",
                s
            )));
        }
        let query_id =
            QueryId::new(parts[0]).map_err(|e| Error::InvalidTaskId(format!("{}: {}", s, e)))?;
        // Only the canonical decimal form, so that parse and display agree:
        // no sign, no leading zeros.
        let number = |part: &str, what: &str| -> Result<u32> {
            let canonical = !part.is_empty()
                && part.bytes().all(|b| b.is_ascii_digit())
                && (part == "0" || !part.starts_with('0'));
            canonical
                .then(|| part.parse().ok())
                .flatten()
                .ok_or_else(|| Error::InvalidTaskId(format!("bad {} {:?} in {:?}", what, part, s)))
        };
        Ok(Self {
            query_id,
            stage_id: number(parts[1], "stage id")?,
            partition_id: number(parts[2], "partition id")?,
            attempt_id: number(parts[3], "attempt id")?,
        })
    }
}

impl TryFrom<String> for TaskId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.to_string()
    }
}
