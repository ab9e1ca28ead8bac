//! Reply envelope exchanged with list services.
//!
//! A list service answers every request with exactly one of `ok` (the full,
//! ordered entity list) or `error` (a human-readable failure).

use serde::{Deserialize, Serialize};

use crate::error::NetError;

/// Reply to a list request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListReply<E> {
    /// The ordered entity list on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<Vec<E>>,
    /// The failure message on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<E> ListReply<E> {
    /// A successful reply.
    #[must_use]
    pub fn ok(entities: Vec<E>) -> Self {
        Self {
            ok: Some(entities),
            error: None,
        }
    }

    /// A failed reply.
    #[must_use]
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: None,
            error: Some(msg.into()),
        }
    }

    /// Convert into the entity list, treating `error` as authoritative.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Remote`] for an error reply and
    /// [`NetError::EmptyReply`] when neither field is set.
    pub fn into_result(self) -> Result<Vec<E>, NetError> {
        match (self.ok, self.error) {
            (_, Some(msg)) => Err(NetError::Remote(msg)),
            (Some(entities), None) => Ok(entities),
            (None, None) => Err(NetError::EmptyReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::codec::{Encoding, decode, encode};

    #[test]
    fn test_ok_reply() {
        let reply: ListReply<Value> =
            serde_json::from_str(r#"{"ok": [{"id": 1, "content": "a"}]}"#).unwrap();
        assert_eq!(
            reply.into_result().unwrap(),
            vec![json!({"id": 1, "content": "a"})]
        );
    }

    #[test]
    fn test_error_reply() {
        let reply: ListReply<Value> =
            serde_json::from_str(r#"{"error": "index offline"}"#).unwrap();
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.to_string(), "remote error: index offline");
    }

    #[test]
    fn test_empty_reply() {
        let reply: ListReply<Value> = serde_json::from_str("{}").unwrap();
        assert!(matches!(reply.into_result(), Err(NetError::EmptyReply)));
    }

    #[test]
    fn test_error_serialisation_omits_ok() {
        let text = serde_json::to_string(&ListReply::<Value>::error("boom")).unwrap();
        assert_eq!(text, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_messagepack_reply_preserves_order() {
        let entities = vec![json!({"id": "b"}), json!({"id": "a"})];
        let bytes = encode(Encoding::MessagePack, &ListReply::ok(entities.clone())).unwrap();
        let reply: ListReply<Value> = decode(Encoding::MessagePack, &bytes).unwrap();
        assert_eq!(reply.into_result().unwrap(), entities);
    }
}
