//! Core types and traits for streamstate
//!
//! This crate defines the foundational types used throughout the system:
//! - StreamId: Opaque identifier assigned by the collection on insert
//! - StreamState: Closed lifecycle enumeration (created/active/interrupted/finished)
//! - Stream: Persisted snapshot of a stream document
//! - transitions: The allowed-transition table and its validator
//! - Error: Error taxonomy shared by every layer
//! - Traits: The persistence contract (StreamCollection)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod transitions;
pub mod types;

pub use error::{Error, Result};
pub use traits::{StreamCollection, StreamFilter, UpdateResult};
pub use transitions::{allowed_targets, is_allowed, validate_transition};
pub use types::{Stream, StreamId, StreamState};
