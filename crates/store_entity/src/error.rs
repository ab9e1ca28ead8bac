//! Entity-layer error types.

/// Errors raised while normalising a fetched entity list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    /// An entity in the batch has no extractable id. The whole batch is
    /// rejected.
    #[error("entity at position {position} has no extractable id")]
    MissingId {
        /// Zero-based position of the offending entity in the response.
        position: usize,
    },
}
