//! Entity trait and the loosely typed [`EntityKey`].
//!
//! The store never interprets an entity's fields beyond asking it for its id.
//! Strongly typed records implement [`Entity`] directly; raw JSON records use
//! the [`serde_json::Value`] impl, which reads the `"id"` field.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Field read by the [`serde_json::Value`] impl of [`Entity`].
pub const ID_FIELD: &str = "id";

/// A record managed by the store.
///
/// The id must be stable for the entity's lifetime in a store. Returning
/// `None` from [`Entity::entity_id`] marks the record as malformed, which
/// rejects the whole batch it arrived in.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The id type used as the key of the lookup mapping.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Extract the entity's id, or `None` if it has none.
    fn entity_id(&self) -> Option<Self::Id>;
}

/// An opaque entity id that is either an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    /// Integer id (e.g. a database primary key).
    Int(i64),
    /// String id (e.g. a slug or UUID).
    Str(String),
}

impl EntityKey {
    /// Read an id out of a JSON value. Only integers and strings qualify.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityKey {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for EntityKey {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

impl Entity for serde_json::Value {
    type Id = EntityKey;

    fn entity_id(&self) -> Option<EntityKey> {
        self.get(ID_FIELD).and_then(EntityKey::from_json)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_string_id() {
        let entity = json!({"id": "a", "title": "Cat A"});
        assert_eq!(entity.entity_id(), Some(EntityKey::from("a")));
    }

    #[test]
    fn test_json_integer_id() {
        let entity = json!({"id": 7, "name": "b"});
        assert_eq!(entity.entity_id(), Some(EntityKey::Int(7)));
    }

    #[test]
    fn test_json_unusable_ids() {
        assert_eq!(json!({"name": "no id"}).entity_id(), None);
        assert_eq!(json!({"id": null}).entity_id(), None);
        assert_eq!(json!({"id": 1.5}).entity_id(), None);
        assert_eq!(json!({"id": true}).entity_id(), None);
        assert_eq!(json!({"id": {"nested": 1}}).entity_id(), None);
        assert_eq!(json!("not an object").entity_id(), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(EntityKey::Int(42).to_string(), "42");
        assert_eq!(EntityKey::from("cats").to_string(), "cats");
    }

    #[test]
    fn test_key_untagged_serialization() {
        let keys = vec![EntityKey::Int(1), EntityKey::from("b")];
        let text = serde_json::to_string(&keys).unwrap();
        assert_eq!(text, r#"[1,"b"]"#);

        let bytes = rmp_serde::to_vec(&keys).unwrap();
        let restored: Vec<EntityKey> = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(keys, restored);
    }
}
