//! Streamstate - optimistic-concurrency lifecycle store for streams
//!
//! A stream moves through a fixed lifecycle:
//!
//! ```text
//! created ──▶ active ◀──▶ interrupted
//!               │              │
//!               └──▶ finished ◀┘
//! ```
//!
//! Transitions go through [`StateStore::set_state`], which reads the
//! current state, validates the move, and writes it back conditioned on the
//! state it read. A concurrent writer that got there first turns the write
//! into [`Error::Conflict`]; nothing is locked and nothing is retried.
//!
//! # Quick Start
//!
//! ```ignore
//! use streamstate::prelude::*;
//!
//! let store = connect(&Endpoint::parse("mem://")?, DEFAULT_DATABASE)?;
//! let stream = store.collection().insert(StreamState::Created)?;
//!
//! store.set_state(&stream.id, StreamState::Active)?;
//! assert_eq!(store.get_stream(&stream.id)?.state, StreamState::Active);
//! ```
//!
//! The [`race`] module holds the concurrent-transition harness run by the
//! `streamstate race` command.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod prelude;
pub mod race;

pub use streamstate_core::{
    allowed_targets, is_allowed, validate_transition, Error, Result, Stream, StreamCollection,
    StreamFilter, StreamId, StreamState, UpdateResult,
};
pub use streamstate_engine::{
    connect, connect_url, connect_with_config, Endpoint, StateStore, StoreConfig, StoreMetrics,
    COLLECTION_NAME, CONFIG_FILE_NAME, DEFAULT_DATABASE,
};
pub use streamstate_storage::{
    DurabilityMode, DurableCollection, MemoryCollection, ReadRendezvous, WAL_FILE_NAME,
};

pub use race::{run_race, RaceConfig, RaceReport};
