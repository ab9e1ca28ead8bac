//! Store error types.

use store_entity::EntityError;

/// Errors surfaced by the fetch action. In every case the previous result set
/// is left untouched and the loading flag is released.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The external fetch source rejected or errored.
    #[error("fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A retrieved entity had no extractable id; the batch was rejected.
    #[error("malformed entity: {0}")]
    MalformedEntity(#[from] EntityError),
}

impl StoreError {
    /// Wrap a fetch source error.
    pub fn fetch(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Fetch(Box::new(err))
    }
}
