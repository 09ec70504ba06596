//! Common imports
//!
//! ```ignore
//! use streamstate::prelude::*;
//! ```

pub use crate::race::{run_race, RaceConfig, RaceReport};
pub use streamstate_core::{Error, Result, Stream, StreamCollection, StreamId, StreamState};
pub use streamstate_engine::{connect, Endpoint, StateStore, DEFAULT_DATABASE};
