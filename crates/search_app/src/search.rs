//! The search results store.
//!
//! A feature store over the generic normalized store: documents returned by
//! a search service, kept in the service's ranking order.

use serde::{Deserialize, Serialize};

use tokio::task::JoinHandle;
use tracing::info;

use store_core::{FetchSource, Settlement, StoreError, StoreFacade, StoreFactory, StoreView};
use store_entity::Entity;

/// Name under which the search store logs.
pub const STORE_NAME: &str = "search";

/// Parameters of one search request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query.
    pub query: String,
    /// Search methods to apply (e.g. `"lucene"`, `"sentence_embedding"`).
    #[serde(default)]
    pub method: Vec<String>,
    /// Corpus ids to search in. Empty means all corpora.
    #[serde(default)]
    pub corpus: Vec<i64>,
}

impl SearchQuery {
    /// A query for `text` with no method or corpus restriction.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            query: text.into(),
            ..Self::default()
        }
    }

    /// Add a search method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method.push(method.into());
        self
    }

    /// Restrict the search to a corpus.
    #[must_use]
    pub fn corpus(mut self, corpus: i64) -> Self {
        self.corpus.push(corpus);
        self
    }
}

/// A document returned by the search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id. A document without one is rejected when normalised.
    #[serde(default)]
    pub id: Option<i64>,
    /// Document text.
    #[serde(default)]
    pub content: String,
    /// Id of the corpus the document belongs to.
    pub corpus: i64,
}

impl Entity for Document {
    type Id = i64;

    fn entity_id(&self) -> Option<i64> {
        self.id
    }
}

/// The search store: `fetch_search_result` plus the derived `results` and
/// `is_loading` views.
#[derive(Debug)]
pub struct SearchStore<S>
where
    S: FetchSource<Query = SearchQuery, Entity = Document>,
{
    inner: StoreFacade<S>,
}

impl<S> SearchStore<S>
where
    S: FetchSource<Query = SearchQuery, Entity = Document>,
{
    /// Bind `source` into a new search store.
    #[must_use]
    pub fn new(factory: &StoreFactory, source: S) -> Self {
        Self {
            inner: factory.build(STORE_NAME, source),
        }
    }

    /// Run a search and replace the current results.
    ///
    /// # Errors
    ///
    /// Propagates the store's fetch failures; the previous results stay
    /// visible.
    pub async fn fetch_search_result(&self, query: &SearchQuery) -> Result<Settlement, StoreError> {
        self.inner.fetch(query).await
    }

    /// Documents in ranking order.
    #[must_use]
    pub fn results(&self) -> Vec<Document> {
        self.inner.results()
    }

    /// Returns `true` while a search is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    /// A read-only view for watchers.
    #[must_use]
    pub fn view(&self) -> StoreView<Document> {
        self.inner.view()
    }
}

/// Log the loading flag on every store transition until the store is
/// dropped. Returns the number of transitions observed.
///
/// Transitions can coalesce, so a search that settles quickly may only be
/// observed in its final, idle state.
pub fn watch_loading(mut view: StoreView<Document>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut observed = 0;
        while view.changed().await {
            observed += 1;
            info!(
                loading = view.is_loading(),
                version = view.version(),
                "search store changed"
            );
        }
        observed
    })
}
