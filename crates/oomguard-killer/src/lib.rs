//! oomguard killer: decides what to terminate when cluster memory runs out.
//!
//! The [`LowMemoryKiller`] trait abstracts over victim-selection policies.
//! Implementations:
//! - `TotalReservationOnBlockedNodesKiller`: prefers killing the largest
//!   task-retry task on each blocked node, then falls back to the query with
//!   the most memory reserved across blocked nodes.
//! - `TotalReservationKiller`: same task phase, falls back to the query with
//!   the largest cluster-wide reservation.
//! - `NoneKiller`: never kills anything.
//!
//! All policies are pure functions of the supplied snapshot.

pub mod blocked_nodes;
pub mod killer;
pub mod tasks;
pub mod total_reservation;

pub use blocked_nodes::TotalReservationOnBlockedNodesKiller;
pub use killer::{LowMemoryKiller, NoneKiller};
pub use tasks::choose_tasks_to_kill;
pub use total_reservation::TotalReservationKiller;

use oomguard_core::KillerPolicy;

/// Build the killer for a configured policy.
pub fn create_killer(policy: KillerPolicy) -> Box<dyn LowMemoryKiller> {
    let killer: Box<dyn LowMemoryKiller> = match policy {
        KillerPolicy::None => Box::new(NoneKiller),
        KillerPolicy::TotalReservation => Box::new(TotalReservationKiller),
        KillerPolicy::TotalReservationOnBlockedNodes => {
            Box::new(TotalReservationOnBlockedNodesKiller)
        }
    };
    tracing::info!("Using low-memory killer: {}", killer.name());
    killer
}
