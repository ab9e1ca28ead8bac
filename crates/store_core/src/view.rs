//! Read-only projections of store state.
//!
//! Views subscribe to the store's `watch` channel. Each state transition
//! marks every subscribed view as changed; views recompute from the current
//! state on the next read instead of holding a stale copy.

use tokio::sync::watch;

use store_entity::Entity;

use crate::state::StoreState;

/// A read-only handle on one store's state.
///
/// Reads always reflect the most recent completed transition. Consumers that
/// want to react to changes await [`StoreView::changed`].
#[derive(Debug, Clone)]
pub struct StoreView<E: Entity> {
    rx: watch::Receiver<StoreState<E>>,
}

impl<E: Entity> StoreView<E> {
    pub(crate) fn new(rx: watch::Receiver<StoreState<E>>) -> Self {
        Self { rx }
    }

    /// The ordered result sequence, recomputed from `order` and `items`.
    #[must_use]
    pub fn results(&self) -> Vec<E> {
        self.rx.borrow().results()
    }

    /// Returns `true` while a fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.rx.borrow().is_loading()
    }

    /// Mutation counter of the state this view currently sees.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.rx.borrow().version()
    }

    /// Wait for the next state transition.
    ///
    /// Returns `false` once the store has been dropped and no further
    /// changes can arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until no fetch is outstanding and return the results at that
    /// point. Returns the last known results if the store is dropped while
    /// waiting.
    pub async fn settled(&mut self) -> Vec<E> {
        if let Ok(state) = self.rx.wait_for(|state| !state.is_loading()).await {
            return state.results();
        }
        self.rx.borrow().results()
    }
}

/// A memoised `results` projection.
///
/// The cached sequence is rebuilt only when the store has transitioned since
/// the last read.
#[derive(Debug)]
pub struct Results<E: Entity> {
    rx: watch::Receiver<StoreState<E>>,
    cache: Vec<E>,
    cached_version: Option<u64>,
    recomputes: usize,
}

impl<E: Entity> Results<E> {
    pub(crate) fn new(rx: watch::Receiver<StoreState<E>>) -> Self {
        Self {
            rx,
            cache: Vec::new(),
            cached_version: None,
            recomputes: 0,
        }
    }

    /// The current ordered result sequence.
    pub fn get(&mut self) -> &[E] {
        let state = self.rx.borrow_and_update();
        if self.cached_version != Some(state.version()) {
            self.cache = state.results();
            self.cached_version = Some(state.version());
            self.recomputes += 1;
        }
        &self.cache
    }

    /// Returns `true` if the store has transitioned since the last read.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.cached_version != Some(self.rx.borrow().version())
    }

    /// Number of times the cache has been rebuilt.
    #[must_use]
    pub fn recomputes(&self) -> usize {
        self.recomputes
    }
}
