//! Stream data model
//!
//! A stream document has exactly three persisted fields:
//! `{ id, state, createdAt }`. The state serializes as a lowercase string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::transitions;

/// Unique identifier for a stream document
///
/// A StreamId is a wrapper around a UUID v4. It is assigned by the
/// collection when the document is inserted and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Create a new random StreamId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a StreamId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a StreamId from its string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    ///
    /// # Errors
    /// Returns `InvalidInput` if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| Error::invalid_input(format!("invalid stream id '{}': {}", s, e)))
    }

    /// Get the raw bytes of this StreamId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StreamId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Lifecycle state of a stream
///
/// Closed enumeration; no other value is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    /// Document exists but the stream has not started
    Created,
    /// Stream is live
    Active,
    /// Stream is paused and may resume
    Interrupted,
    /// Terminal state
    Finished,
}

impl StreamState {
    /// Every state, in declaration order
    pub const ALL: [StreamState; 4] = [
        StreamState::Created,
        StreamState::Active,
        StreamState::Interrupted,
        StreamState::Finished,
    ];

    /// Persisted string form
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Created => "created",
            StreamState::Active => "active",
            StreamState::Interrupted => "interrupted",
            StreamState::Finished => "finished",
        }
    }

    /// True when the table allows no outgoing transition
    pub fn is_terminal(&self) -> bool {
        transitions::allowed_targets(*self).is_empty()
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        StreamState::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "unknown stream state '{}' (expected created, active, interrupted or finished)",
                    s
                ))
            })
    }
}

/// Snapshot of a persisted stream document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Identifier assigned at creation
    pub id: StreamId,
    /// Current lifecycle state
    pub state: StreamState,
    /// Creation time, immutable
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Stream {
    /// Build a fresh document with a new id, stamped now
    pub fn new(state: StreamState) -> Self {
        Self {
            id: StreamId::new(),
            state,
            created_at: Utc::now(),
        }
    }

    /// Move this snapshot to `target` if the transition table allows it.
    ///
    /// On rejection the snapshot is left untouched and the error carries the
    /// current state.
    pub fn transition_to(&mut self, target: StreamState) -> Result<()> {
        transitions::validate_transition(self.state, target)?;
        self.state = target;
        Ok(())
    }
}
