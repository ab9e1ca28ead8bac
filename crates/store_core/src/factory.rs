//! Store factory and the facade it produces.
//!
//! A [`StoreFacade`] wraps one [`NormalizedStore`] and exposes only the fetch
//! action and the derived views. The mapping and order are not reachable
//! through it, so callers cannot break the ordering invariants by writing to
//! them. Feature stores wrap a facade and rename the action (e.g.
//! `fetch_search_result`).

use tokio::task::JoinHandle;

use crate::config::{SettlementPolicy, StoreConfig};
use crate::error::StoreError;
use crate::source::FetchSource;
use crate::store::{NormalizedStore, Settlement};
use crate::view::{Results, StoreView};

/// Builds store facades with shared defaults.
#[derive(Debug, Clone, Default)]
pub struct StoreFactory {
    policy: SettlementPolicy,
}

impl StoreFactory {
    /// Create a factory with the default settlement policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `policy` for every store this factory builds.
    #[must_use]
    pub fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bind `source` into a new store named `name`.
    #[must_use]
    pub fn build<S: FetchSource>(&self, name: impl Into<String>, source: S) -> StoreFacade<S> {
        let config = StoreConfig::new(name).with_policy(self.policy);
        StoreFacade::from_config(config, source)
    }
}

/// The consumer-facing surface of one store.
#[derive(Debug)]
pub struct StoreFacade<S: FetchSource> {
    store: NormalizedStore<S>,
}

impl<S: FetchSource> StoreFacade<S> {
    /// Build a facade from an explicit config.
    #[must_use]
    pub fn from_config(config: StoreConfig, source: S) -> Self {
        Self {
            store: NormalizedStore::new(config, source),
        }
    }

    /// Returns the store name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.store.name()
    }

    /// Returns the unique id of the underlying store instance.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        self.store.instance_id()
    }

    /// Fetch and replace the result set. See
    /// [`NormalizedStore::fetch_resource_list`].
    ///
    /// # Errors
    ///
    /// Propagates fetch and malformed-entity failures.
    pub async fn fetch(&self, query: &S::Query) -> Result<Settlement, StoreError> {
        self.store.fetch_resource_list(query).await
    }

    /// Fetch on a background task. See [`NormalizedStore::spawn_fetch`].
    pub fn spawn_fetch(&self, query: S::Query) -> JoinHandle<Result<Settlement, StoreError>> {
        self.store.spawn_fetch(query)
    }

    /// The ordered result sequence.
    #[must_use]
    pub fn results(&self) -> Vec<S::Entity> {
        self.store.results()
    }

    /// Returns `true` while a fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// A read-only view for consumers that outlive a single read.
    #[must_use]
    pub fn view(&self) -> StoreView<S::Entity> {
        self.store.view()
    }

    /// A memoised results view.
    #[must_use]
    pub fn results_view(&self) -> Results<S::Entity> {
        self.store.results_view()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("no results for {0}")]
    struct NotFound(String);

    struct Shelf;

    impl FetchSource for Shelf {
        type Query = String;
        type Entity = Value;
        type Error = NotFound;

        async fn fetch(&self, query: &String) -> Result<Vec<Value>, NotFound> {
            match query.as_str() {
                "cats" => Ok(vec![
                    json!({"id": "a", "title": "Cat A"}),
                    json!({"id": "b", "title": "Cat B"}),
                ]),
                other => Err(NotFound(other.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_factory_builds_independent_stores() {
        let factory = StoreFactory::new();
        let first = factory.build("search", Shelf);
        let second = factory.build("search", Shelf);
        assert_ne!(first.instance_id(), second.instance_id());

        first.fetch(&"cats".to_string()).await.unwrap();
        assert_eq!(first.results().len(), 2);
        assert!(second.results().is_empty());
    }

    #[tokio::test]
    async fn test_facade_surfaces_fetch_failure() {
        let store = StoreFactory::new().build("search", Shelf);
        store.fetch(&"cats".to_string()).await.unwrap();

        let err = store.fetch(&"dogs".to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "fetch failed: no results for dogs");
        assert_eq!(store.results().len(), 2);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_factory_policy_applies_to_built_stores() {
        let factory = StoreFactory::new().with_policy(SettlementPolicy::LastSettled);
        let store = factory.build("search", Shelf);
        assert_eq!(store.name(), "search");
        assert_eq!(store.store.config().policy, SettlementPolicy::LastSettled);
    }
}
