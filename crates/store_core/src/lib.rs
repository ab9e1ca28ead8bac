//! # store_core
//!
//! A generic, reusable client-side entity store.
//!
//! Each store instance owns one [`StoreState`]: an id-indexed mapping of
//! entities, a separate ordering sequence, and a loading flag. The single
//! mutating action, [`NormalizedStore::fetch_resource_list`], retrieves a
//! complete list from an injected [`FetchSource`], normalises it and replaces
//! the previous result wholesale.
//!
//! This crate provides:
//!
//! - [`NormalizedStore`] — state ownership and the fetch action.
//! - [`FetchSource`] — the boundary trait for the external fetch transport.
//! - [`StoreView`] / [`Results`] — read-only projections recomputed from the
//!   current state.
//! - [`StoreFactory`] / [`StoreFacade`] — binds a fetch source into a store
//!   and exposes only the derived views plus the action.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use store_core::{FetchSource, StoreFactory};
//!
//! struct Catalog;
//!
//! impl FetchSource for Catalog {
//!     type Query = String;
//!     type Entity = serde_json::Value;
//!     type Error = std::io::Error;
//!
//!     async fn fetch(&self, query: &String) -> Result<Vec<serde_json::Value>, std::io::Error> {
//!         Ok(vec![serde_json::json!({"id": query.clone()})])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = StoreFactory::new().build("catalog", Catalog);
//!     store.fetch(&"cats".to_string()).await.unwrap();
//!     assert_eq!(store.results().len(), 1);
//!     assert!(!store.is_loading());
//! }
//! ```

pub mod config;
pub mod error;
pub mod factory;
pub mod source;
pub mod state;
pub mod store;
pub mod view;

pub use config::{SettlementPolicy, StoreConfig};
pub use error::StoreError;
pub use factory::{StoreFacade, StoreFactory};
pub use source::FetchSource;
pub use state::StoreState;
pub use store::{NormalizedStore, Settlement};
pub use view::{Results, StoreView};

pub use store_entity::{Entity, EntityKey};
