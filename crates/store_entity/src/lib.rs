//! # store_entity
//!
//! Entity identity and normalisation — the leaf of the normalized entity
//! store.
//!
//! This crate provides:
//!
//! - [`Entity`] trait — the contract every stored record must satisfy: it can
//!   report its own id.
//! - [`EntityKey`] — an opaque string-or-integer id for loosely typed records.
//! - [`Normalized`] — an id-indexed lookup mapping plus a separate ordering
//!   sequence.
//! - [`normalize`] — splits a fetched list into a [`Normalized`] pair.

pub mod entity;
pub mod error;
pub mod normalize;

pub use entity::{Entity, EntityKey};
pub use error::EntityError;
pub use normalize::{Normalized, normalize};
