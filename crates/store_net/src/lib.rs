//! # store_net
//!
//! NATS transport for the normalized entity store.
//!
//! This crate provides:
//!
//! - [`source`] — [`NatsSource`], a [`store_core::FetchSource`] that issues a
//!   NATS request and decodes the reply into an entity list.
//! - [`messages`] — the reply envelope exchanged with list services.
//! - [`codec`] — JSON and MessagePack encoding helpers.
//! - [`connection`] — NATS connection management.
//! - [`error`] — Network-layer error types.

pub mod codec;
pub mod connection;
pub mod error;
pub mod messages;
pub mod source;

pub use codec::{Encoding, decode, encode};
pub use connection::NatsConnection;
pub use error::NetError;
pub use messages::ListReply;
pub use source::{NatsSource, NatsSourceConfig, decode_reply};
