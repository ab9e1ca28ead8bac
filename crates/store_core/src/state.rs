//! Store state and its synchronous transitions.
//!
//! A [`StoreState`] is only ever mutated inside a single `watch::Sender`
//! modification, so each transition runs to completion before any reader or
//! other fetch observes the state.

use store_entity::{Entity, Normalized};

use crate::config::SettlementPolicy;

/// The state owned by one store instance.
///
/// `is_loading` is derived from the number of outstanding fetches, so it is
/// true exactly while at least one fetch has been issued and not settled.
#[derive(Debug, Clone)]
pub struct StoreState<E: Entity> {
    /// Result set of the last applied fetch.
    data: Normalized<E>,
    /// Fetches issued and not yet settled.
    outstanding: usize,
    /// Bumped on every transition.
    version: u64,
    /// Generation of the most recently issued fetch.
    latest_issued: u64,
    /// Generation of the fetch whose result is currently held (0 = none).
    latest_applied: u64,
}

/// What a settlement did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Applied {
    /// The result set was replaced.
    Replaced,
    /// The result was older than a newer issued fetch and was ignored.
    Stale,
}

impl<E: Entity> StoreState<E> {
    /// The initial state: empty mapping, empty order, not loading.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Normalized::new(),
            outstanding: 0,
            version: 0,
            latest_issued: 0,
            latest_applied: 0,
        }
    }

    /// Returns `true` while any fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.outstanding > 0
    }

    /// Number of fetches issued and not yet settled.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Monotonic mutation counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Generation of the fetch whose result is held, or 0 before the first
    /// successful fetch.
    #[must_use]
    pub fn applied_generation(&self) -> u64 {
        self.latest_applied
    }

    /// The normalised result set (mapping and order).
    #[must_use]
    pub fn normalized(&self) -> &Normalized<E> {
        &self.data
    }

    /// Project the mapping through the order into a fresh sequence.
    #[must_use]
    pub fn results(&self) -> Vec<E> {
        self.data.iter_ordered().cloned().collect()
    }

    /// Record a newly issued fetch and return its generation.
    pub(crate) fn begin(&mut self) -> u64 {
        self.latest_issued += 1;
        self.outstanding += 1;
        self.version += 1;
        self.latest_issued
    }

    /// Settle a successful fetch, replacing the result set unless the policy
    /// marks it stale.
    pub(crate) fn settle_success(
        &mut self,
        generation: u64,
        data: Normalized<E>,
        policy: SettlementPolicy,
    ) -> Applied {
        self.release();
        let stale = match policy {
            SettlementPolicy::LatestOnly => generation != self.latest_issued,
            SettlementPolicy::LastSettled => false,
        };
        if stale {
            return Applied::Stale;
        }
        self.data = data;
        self.latest_applied = generation;
        Applied::Replaced
    }

    /// Settle a failed or abandoned fetch. The result set is untouched.
    pub(crate) fn settle_failure(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.version += 1;
    }
}

impl<E: Entity> Default for StoreState<E> {
    fn default() -> Self {
        Self::new()
    }
}
