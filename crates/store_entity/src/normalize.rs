//! Normalisation of fetched entity lists.
//!
//! A fetched list is split into an id-keyed lookup mapping (`items`) and a
//! separate ordering sequence (`order`). The source order is authoritative and
//! kept verbatim; nothing is sorted client-side.

use std::collections::HashMap;

use crate::entity::Entity;
use crate::error::EntityError;

/// An id-indexed mapping plus an ordering sequence.
///
/// Every id in `order` has an entry in `items`. `order` may repeat an id
/// when the source response repeated it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<E: Entity> {
    items: HashMap<E::Id, E>,
    order: Vec<E::Id>,
}

impl<E: Entity> Normalized<E> {
    /// Create an empty mapping with an empty order.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Look up an entity by id.
    #[must_use]
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.items.get(id)
    }

    /// Returns `true` if the mapping holds an entity with this id.
    #[must_use]
    pub fn contains(&self, id: &E::Id) -> bool {
        self.items.contains_key(id)
    }

    /// The ordering sequence.
    #[must_use]
    pub fn order(&self) -> &[E::Id] {
        &self.order
    }

    /// The lookup mapping.
    #[must_use]
    pub fn items(&self) -> &HashMap<E::Id, E> {
        &self.items
    }

    /// Number of positions in the ordering sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the ordering sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate entities in order by mapping `order` through `items`.
    pub fn iter_ordered(&self) -> impl Iterator<Item = &E> {
        // Every ordered id resolves, so filter_map never drops a position.
        self.order.iter().filter_map(|id| self.items.get(id))
    }
}

impl<E: Entity> Default for Normalized<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a fetched list into a fresh [`Normalized`] pair.
///
/// Duplicate ids resolve last-write-wins in the mapping while every position
/// stays in `order`.
///
/// # Errors
///
/// Returns [`EntityError::MissingId`] for the first entity without an id.
/// Nothing is partially normalised.
pub fn normalize<E: Entity>(entities: Vec<E>) -> Result<Normalized<E>, EntityError> {
    let mut items = HashMap::with_capacity(entities.len());
    let mut order = Vec::with_capacity(entities.len());

    for (position, entity) in entities.into_iter().enumerate() {
        let id = entity
            .entity_id()
            .ok_or(EntityError::MissingId { position })?;
        order.push(id.clone());
        items.insert(id, entity);
    }

    Ok(Normalized { items, order })
}
