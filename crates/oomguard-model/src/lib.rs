//! Memory snapshot model: what the cluster monitor reports, and what the
//! low-memory killer hands back.
//!
//! Every value here is a per-cycle snapshot: built fresh by the monitor,
//! read-only to the killer, dropped after the decision.

pub mod snapshot;
pub mod target;

pub use snapshot::*;
pub use target::KillTarget;
