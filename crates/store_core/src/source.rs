//! The fetch source boundary.
//!
//! The store does not know how entities are retrieved. A [`FetchSource`]
//! takes an opaque query and resolves to an ordered list of entities or an
//! error. Transport, encoding and retry policy all live on the implementor's
//! side of this trait.

use std::future::Future;

use store_entity::Entity;

/// An asynchronous provider of complete entity lists.
pub trait FetchSource: Send + Sync + 'static {
    /// Descriptor passed through to the source unchanged.
    type Query: Send + Sync + 'static;
    /// The entity type this source produces.
    type Entity: Entity;
    /// The source's failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Retrieve the full, ordered list of entities for `query`.
    fn fetch(
        &self,
        query: &Self::Query,
    ) -> impl Future<Output = Result<Vec<Self::Entity>, Self::Error>> + Send;
}
