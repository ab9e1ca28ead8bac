//! The normalized entity store and its fetch action.
//!
//! The store owns its [`StoreState`] behind a `tokio::sync::watch` sender.
//! Every transition (issuing a fetch, settling it) is a single synchronous
//! `send_modify` call; the only suspension point of
//! [`NormalizedStore::fetch_resource_list`] is the await on the fetch source.
//!
//! ## State machine
//!
//! - `Idle --fetch_resource_list--> Loading`
//! - `Loading --success--> Idle` (result set replaced)
//! - `Loading --failure--> Idle` (result set unchanged, error surfaced)

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use store_entity::{Entity, normalize};

use crate::config::{SettlementPolicy, StoreConfig};
use crate::error::StoreError;
use crate::source::FetchSource;
use crate::state::{Applied, StoreState};
use crate::view::{Results, StoreView};

type StateCell<E> = watch::Sender<StoreState<E>>;

/// Outcome of a fetch that reached settlement without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result set was replaced with `count` ordered entries.
    Applied {
        /// Generation number of the fetch.
        generation: u64,
        /// Length of the new ordering sequence.
        count: usize,
    },
    /// A newer fetch had been issued, so this result was dropped.
    Discarded {
        /// Generation number of the fetch.
        generation: u64,
    },
    /// The store was dropped before the fetch settled.
    Detached,
}

/// A store holding one normalised entity list fetched from `S`.
pub struct NormalizedStore<S: FetchSource> {
    config: StoreConfig,
    instance_id: String,
    source: Arc<S>,
    state: Arc<StateCell<S::Entity>>,
}

impl<S: FetchSource> NormalizedStore<S> {
    /// Create a store in the initial `Idle` state with an empty result set.
    #[must_use]
    pub fn new(config: StoreConfig, source: S) -> Self {
        let (state, _) = watch::channel(StoreState::new());
        let instance_id = Uuid::new_v4().to_string();
        debug!(store = config.name, instance_id, "store created");
        Self {
            config,
            instance_id,
            source: Arc::new(source),
            state: Arc::new(state),
        }
    }

    /// Returns the store's configured name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the unique id of this store instance.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns `true` while a fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// The current result sequence.
    #[must_use]
    pub fn results(&self) -> Vec<S::Entity> {
        self.state.borrow().results()
    }

    /// A clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreState<S::Entity> {
        self.state.borrow().clone()
    }

    /// Open a read-only view that tracks this store's state.
    #[must_use]
    pub fn view(&self) -> StoreView<S::Entity> {
        StoreView::new(self.state.subscribe())
    }

    /// Open a memoised results view.
    #[must_use]
    pub fn results_view(&self) -> Results<S::Entity> {
        Results::new(self.state.subscribe())
    }

    /// Fetch a complete list from the source and replace the result set.
    ///
    /// The loading flag is raised before the source is called and released
    /// when the fetch settles. If this future is dropped before settlement,
    /// the flag is released as well.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fetch`] if the source fails and
    /// [`StoreError::MalformedEntity`] if an entity has no id. The previous
    /// result set is kept in both cases.
    pub async fn fetch_resource_list(&self, query: &S::Query) -> Result<Settlement, StoreError> {
        let pending = InFlight::begin(&self.state, &self.config, &self.instance_id);
        let outcome = self.source.fetch(query).await;
        pending.settle(outcome)
    }

    /// Run [`fetch_resource_list`](Self::fetch_resource_list) on a tokio task.
    ///
    /// The loading flag is raised before this returns. The task only holds a
    /// weak reference to the state, so dropping the store before settlement
    /// turns the settlement into a no-op that reports
    /// [`Settlement::Detached`].
    pub fn spawn_fetch(&self, query: S::Query) -> JoinHandle<Result<Settlement, StoreError>> {
        let pending = InFlight::begin(&self.state, &self.config, &self.instance_id);
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let outcome = source.fetch(&query).await;
            pending.settle(outcome)
        })
    }
}

impl<S: FetchSource> std::fmt::Debug for NormalizedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("NormalizedStore")
            .field("name", &self.config.name)
            .field("instance_id", &self.instance_id)
            .field("len", &state.normalized().len())
            .field("is_loading", &state.is_loading())
            .finish()
    }
}

/// An issued fetch that has not settled yet.
///
/// Dropping it without calling [`InFlight::settle`] counts as a failed
/// settlement, so the loading flag can never outlive its fetch.
struct InFlight<E: Entity> {
    state: Weak<StateCell<E>>,
    generation: u64,
    policy: SettlementPolicy,
    store: String,
    instance_id: String,
    settled: bool,
}

impl<E: Entity> InFlight<E> {
    fn begin(state: &Arc<StateCell<E>>, config: &StoreConfig, instance_id: &str) -> Self {
        let mut generation = 0;
        state.send_modify(|s| generation = s.begin());
        debug!(store = config.name, instance_id, generation, "fetch started");
        Self {
            state: Arc::downgrade(state),
            generation,
            policy: config.policy,
            store: config.name.clone(),
            instance_id: instance_id.to_string(),
            settled: false,
        }
    }

    fn settle<FetchErr>(
        mut self,
        outcome: Result<Vec<E>, FetchErr>,
    ) -> Result<Settlement, StoreError>
    where
        FetchErr: std::error::Error + Send + Sync + 'static,
    {
        self.settled = true;
        let generation = self.generation;

        // Normalise before touching state so the transition stays synchronous.
        let normalized = outcome
            .map_err(StoreError::fetch)
            .and_then(|entities| normalize(entities).map_err(StoreError::from));

        let Some(state) = self.state.upgrade() else {
            debug!(store = self.store, generation, "store dropped before settlement");
            return normalized.map(|_| Settlement::Detached);
        };

        match normalized {
            Ok(data) => {
                let count = data.len();
                let mut applied = Applied::Stale;
                state.send_modify(|s| applied = s.settle_success(generation, data, self.policy));
                match applied {
                    Applied::Replaced => {
                        info!(
                            store = self.store,
                            instance_id = self.instance_id,
                            generation,
                            count,
                            "fetch applied"
                        );
                        Ok(Settlement::Applied { generation, count })
                    }
                    Applied::Stale => {
                        debug!(
                            store = self.store,
                            instance_id = self.instance_id,
                            generation,
                            "stale fetch discarded"
                        );
                        Ok(Settlement::Discarded { generation })
                    }
                }
            }
            Err(err) => {
                state.send_modify(StoreState::settle_failure);
                warn!(
                    store = self.store,
                    instance_id = self.instance_id,
                    generation,
                    error = %err,
                    "fetch failed"
                );
                Err(err)
            }
        }
    }
}

impl<E: Entity> Drop for InFlight<E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Some(state) = self.state.upgrade() {
            state.send_modify(StoreState::settle_failure);
            warn!(
                store = self.store,
                generation = self.generation,
                "fetch dropped before settlement"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{Value, json};
    use store_entity::EntityKey;
    use tokio::sync::oneshot;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("source unavailable")]
    struct Unavailable;

    type Reply = Result<Vec<Value>, Unavailable>;

    /// Holds each fetch pending until the test answers it through the
    /// matching oneshot sender.
    #[derive(Default)]
    struct Scripted {
        pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl Scripted {
        fn expect(&self, query: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().insert(query.to_string(), rx);
            tx
        }
    }

    impl FetchSource for Arc<Scripted> {
        type Query = String;
        type Entity = Value;
        type Error = Unavailable;

        async fn fetch(&self, query: &String) -> Reply {
            let rx = self.pending.lock().unwrap().remove(query);
            match rx {
                Some(rx) => rx.await.unwrap_or(Err(Unavailable)),
                None => Err(Unavailable),
            }
        }
    }

    /// Resolves immediately with a fixed list.
    struct Fixed(Vec<Value>);

    impl FetchSource for Fixed {
        type Query = ();
        type Entity = Value;
        type Error = Unavailable;

        async fn fetch(&self, _query: &()) -> Reply {
            Ok(self.0.clone())
        }
    }

    fn scripted_store(policy: SettlementPolicy) -> (NormalizedStore<Arc<Scripted>>, Arc<Scripted>) {
        let source = Arc::new(Scripted::default());
        let store = NormalizedStore::new(
            StoreConfig::new("test").with_policy(policy),
            Arc::clone(&source),
        );
        (store, source)
    }

    fn cats() -> Vec<Value> {
        vec![
            json!({"id": "a", "title": "Cat A"}),
            json!({"id": "b", "title": "Cat B"}),
        ]
    }

    #[tokio::test]
    async fn test_cats_scenario() {
        let (store, source) = scripted_store(SettlementPolicy::LatestOnly);
        assert!(!store.is_loading());
        assert!(store.results().is_empty());

        let reply = source.expect("cats");
        let handle = store.spawn_fetch("cats".to_string());

        assert!(store.is_loading());
        assert!(store.results().is_empty());

        reply.send(Ok(cats())).unwrap();
        let settlement = handle.await.unwrap().unwrap();

        assert_eq!(
            settlement,
            Settlement::Applied {
                generation: 1,
                count: 2
            }
        );
        assert_eq!(store.results(), cats());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_order_and_items_match_response() {
        let response = vec![json!({"id": 3}), json!({"id": 1}), json!({"id": 2})];
        let store = NormalizedStore::new(StoreConfig::new("fixed"), Fixed(response.clone()));
        store.fetch_resource_list(&()).await.unwrap();

        let snapshot = store.snapshot();
        let order: Vec<_> = snapshot.normalized().order().to_vec();
        assert_eq!(order, vec![EntityKey::Int(3), EntityKey::Int(1), EntityKey::Int(2)]);
        for (id, entity) in order.iter().zip(&response) {
            assert_eq!(snapshot.normalized().get(id), Some(entity));
        }
        assert_eq!(store.results(), response);
    }

    #[tokio::test]
    async fn test_empty_response() {
        let store = NormalizedStore::new(StoreConfig::new("fixed"), Fixed(Vec::new()));
        let settlement = store.fetch_resource_list(&()).await.unwrap();
        assert_eq!(
            settlement,
            Settlement::Applied {
                generation: 1,
                count: 0
            }
        );

        let snapshot = store.snapshot();
        assert!(snapshot.normalized().items().is_empty());
        assert!(snapshot.normalized().order().is_empty());
        assert!(store.results().is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_duplicate_ids() {
        let store = NormalizedStore::new(
            StoreConfig::new("fixed"),
            Fixed(vec![json!({"id": 1, "name": "a"}), json!({"id": 1, "name": "b"})]),
        );
        store.fetch_resource_list(&()).await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.normalized().items().len(), 1);
        assert_eq!(snapshot.normalized().order(), &[EntityKey::Int(1), EntityKey::Int(1)]);
        assert_eq!(
            store.results(),
            vec![json!({"id": 1, "name": "b"}), json!({"id": 1, "name": "b"})]
        );
    }

    #[tokio::test]
    async fn test_sequential_fetches_are_idempotent() {
        let store = NormalizedStore::new(StoreConfig::new("fixed"), Fixed(cats()));
        store.fetch_resource_list(&()).await.unwrap();
        let first = store.results();
        store.fetch_resource_list(&()).await.unwrap();
        assert_eq!(store.results(), first);
        assert_eq!(store.snapshot().applied_generation(), 2);
    }

    #[tokio::test]
    async fn test_failure_preserves_previous_result() {
        let (store, source) = scripted_store(SettlementPolicy::LatestOnly);

        source.expect("cats").send(Ok(cats())).unwrap();
        store.fetch_resource_list(&"cats".to_string()).await.unwrap();
        let before = store.snapshot().normalized().clone();

        let reply = source.expect("dogs");
        let handle = store.spawn_fetch("dogs".to_string());
        assert!(store.is_loading());
        reply.send(Err(Unavailable)).unwrap();

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, StoreError::Fetch(_)));
        assert_eq!(store.snapshot().normalized(), &before);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_malformed_entity_rejects_batch() {
        let (store, source) = scripted_store(SettlementPolicy::LatestOnly);

        source.expect("cats").send(Ok(cats())).unwrap();
        store.fetch_resource_list(&"cats".to_string()).await.unwrap();

        source
            .expect("broken")
            .send(Ok(vec![json!({"id": "c"}), json!({"title": "no id"})]))
            .unwrap();
        let err = store
            .fetch_resource_list(&"broken".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::MalformedEntity(_)));
        assert_eq!(store.results(), cats());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_latest_only_drops_stale_settlement() {
        let (store, source) = scripted_store(SettlementPolicy::LatestOnly);

        let slow = source.expect("slow");
        let fast = source.expect("fast");
        let first = store.spawn_fetch("slow".to_string());
        let second = store.spawn_fetch("fast".to_string());

        fast.send(Ok(vec![json!({"id": "fast"})])).unwrap();
        assert!(matches!(
            second.await.unwrap().unwrap(),
            Settlement::Applied { generation: 2, .. }
        ));
        // The slow fetch is still outstanding.
        assert!(store.is_loading());

        slow.send(Ok(vec![json!({"id": "slow"})])).unwrap();
        assert_eq!(
            first.await.unwrap().unwrap(),
            Settlement::Discarded { generation: 1 }
        );
        assert_eq!(store.results(), vec![json!({"id": "fast"})]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_last_settled_lets_late_response_win() {
        let (store, source) = scripted_store(SettlementPolicy::LastSettled);

        let slow = source.expect("slow");
        let fast = source.expect("fast");
        let first = store.spawn_fetch("slow".to_string());
        let second = store.spawn_fetch("fast".to_string());

        fast.send(Ok(vec![json!({"id": "fast"})])).unwrap();
        second.await.unwrap().unwrap();
        slow.send(Ok(vec![json!({"id": "slow"})])).unwrap();
        first.await.unwrap().unwrap();

        assert_eq!(store.results(), vec![json!({"id": "slow"})]);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_store_detaches_settlement() {
        let (store, source) = scripted_store(SettlementPolicy::LatestOnly);
        let view = store.view();

        let reply = source.expect("cats");
        let handle = store.spawn_fetch("cats".to_string());
        drop(store);

        reply.send(Ok(cats())).unwrap();
        assert_eq!(handle.await.unwrap().unwrap(), Settlement::Detached);
        // The view keeps the last state it saw.
        assert!(view.results().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_loading() {
        let (store, source) = scripted_store(SettlementPolicy::LatestOnly);
        let _reply = source.expect("never");

        let query = "never".to_string();
        let fetch = store.fetch_resource_list(&query);
        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(10), fetch).await;

        assert!(timed_out.is_err());
        assert!(!store.is_loading());
        assert_eq!(store.snapshot().outstanding(), 0);
    }
}
