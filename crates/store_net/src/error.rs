//! Network-layer error types.

/// Errors that can occur while fetching a list over NATS.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a message to MessagePack.
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a message from MessagePack.
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Failed to encode or decode a JSON message.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// NATS request error (no responders, transport failure).
    #[error("NATS request error: {0}")]
    Request(#[from] async_nats::RequestError),

    /// No reply arrived within the configured timeout.
    #[error("request on {subject} timed out after {timeout_ms} ms")]
    Timeout {
        /// Subject the request was sent on.
        subject: String,
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// The list service replied with an error.
    #[error("remote error: {0}")]
    Remote(String),

    /// The reply carried neither a list nor an error.
    #[error("empty reply")]
    EmptyReply,
}
