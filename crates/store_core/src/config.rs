//! Store configuration.

use serde::{Deserialize, Serialize};

/// How settlements of overlapping fetches are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Only the most recently issued fetch may replace the result set. A
    /// success from an older fetch is discarded.
    #[default]
    LatestOnly,
    /// Whichever fetch settles last determines the result set, regardless of
    /// the order the fetches were issued in.
    LastSettled,
}

/// Configuration for one store instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Human-readable store name (e.g. `"search"`), used in logs.
    pub name: String,
    /// Reconciliation policy for overlapping fetches.
    #[serde(default)]
    pub policy: SettlementPolicy,
}

impl StoreConfig {
    /// Create a config with the given name and the default policy.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: SettlementPolicy::default(),
        }
    }

    /// Override the settlement policy.
    #[must_use]
    pub fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }
}
