//! Killer policy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable consulted by [`KillerConfig::from_env`].
pub const KILLER_POLICY_ENV: &str = "OOMGUARD_KILLER_POLICY";

/// Which low-memory killer the governor runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KillerPolicy {
    /// Never choose a victim.
    None,
    /// Fall back to the query with the largest cluster-wide reservation.
    TotalReservation,
    /// Fall back to the query with the largest reservation summed over blocked nodes.
    #[default]
    TotalReservationOnBlockedNodes,
}

impl KillerPolicy {
    pub fn all() -> &'static [KillerPolicy] {
        &[
            Self::None,
            Self::TotalReservation,
            Self::TotalReservationOnBlockedNodes,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TotalReservation => "total-reservation",
            Self::TotalReservationOnBlockedNodes => "total-reservation-on-blocked-nodes",
        }
    }
}

impl fmt::Display for KillerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KillerPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| Error::Config(format!("unknown killer policy: {}", s)))
    }
}

/// Low-memory killer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillerConfig {
    #[serde(default)]
    pub policy: KillerPolicy,
}

impl KillerConfig {
    /// Read the policy from `OOMGUARD_KILLER_POLICY`, defaulting when unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let policy = match lookup(KILLER_POLICY_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => KillerPolicy::default(),
        };
        debug!("Killer policy resolved to {}", policy);
        Ok(Self { policy })
    }

    pub fn with_policy(mut self, policy: KillerPolicy) -> Self {
        self.policy = policy;
        self
    }
}
