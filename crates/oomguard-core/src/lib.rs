//! oomguard core: typed identifiers, killer configuration and error types.

pub mod config;
pub mod error;
pub mod ids;

pub use config::{KillerConfig, KillerPolicy};
pub use error::{Error, Result};
pub use ids::{QueryId, TaskId};
