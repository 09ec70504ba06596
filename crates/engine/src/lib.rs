//! Stream lifecycle engine
//!
//! This crate sits on top of the storage collaborators:
//! - StateStore: GetStream, SetState (validated, race-checked), SetStateAdmin
//! - Endpoint parsing and database namespaces
//! - `streamstate.toml` configuration
//! - `connect`: open a store against an endpoint
//!
//! The store is the only component that knows the read-validate-write
//! protocol; storage only provides atomic filtered updates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod endpoint;
pub mod store;

pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use database::{connect, connect_url, connect_with_config};
pub use endpoint::{validate_database_name, Endpoint, COLLECTION_NAME, DEFAULT_DATABASE};
pub use store::{StateStore, StoreMetrics};
