//! Error types for streamstate
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! The first four variants are the operation-level outcomes of the state
//! store. `Conflict` is a normal result under contention; the rest describe
//! failures of the persistence collaborator or of caller input.

use crate::types::{StreamId, StreamState};
use std::io;
use thiserror::Error;

/// Result type alias for streamstate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for streamstate
#[derive(Debug, Error)]
pub enum Error {
    /// No document matches the identifier
    #[error("stream not found: {0}")]
    NotFound(StreamId),

    /// The requested transition is not in the allowed-transition table
    #[error(
        "could not change stream state: transition is not allowed (current state: {current}, requested: {requested})"
    )]
    InvalidTransition {
        /// State observed when the transition was evaluated
        current: StreamState,
        /// State the caller asked for
        requested: StreamState,
    },

    /// The conditional write found the state changed since it was read
    #[error(
        "could not change stream state: race detected on {id}, state is no longer {expected}"
    )]
    Conflict {
        /// Stream that lost the race
        id: StreamId,
        /// Precondition state the write was guarded on
        expected: StreamState,
    },

    /// The persistence collaborator cannot be reached or refused the request
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persisted data failed an integrity check
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Malformed caller input (identifiers, endpoints, config values)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for the optimistic-concurrency race signal
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// True when no document matched the identifier
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when the transition table rejected the request
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }

    /// Whether re-reading and trying again can succeed without outside help.
    ///
    /// Only a lost race qualifies. The store itself never retries.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Shorthand for an [`Error::Unavailable`] from anything displayable
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Error::Unavailable(msg.into())
    }

    /// Shorthand for an [`Error::InvalidInput`] from anything displayable
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
