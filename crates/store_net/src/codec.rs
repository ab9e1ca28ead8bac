//! Payload codec helpers.
//!
//! List services speak either JSON or MessagePack; the encoding is chosen per
//! source.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Wire encoding of request and reply payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8 JSON.
    #[default]
    Json,
    /// MessagePack, via `rmp-serde`.
    MessagePack,
}

/// Encode a value.
///
/// # Errors
///
/// Returns [`NetError::Json`] or [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(encoding: Encoding, value: &T) -> Result<Vec<u8>, NetError> {
    match encoding {
        Encoding::Json => serde_json::to_vec(value).map_err(NetError::Json),
        Encoding::MessagePack => rmp_serde::to_vec_named(value).map_err(NetError::Encode),
    }
}

/// Decode a value.
///
/// # Errors
///
/// Returns [`NetError::Json`] or [`NetError::Decode`] if deserialisation
/// fails.
pub fn decode<T: DeserializeOwned>(encoding: Encoding, bytes: &[u8]) -> Result<T, NetError> {
    match encoding {
        Encoding::Json => serde_json::from_slice(bytes).map_err(NetError::Json),
        Encoding::MessagePack => rmp_serde::from_slice(bytes).map_err(NetError::Decode),
    }
}
