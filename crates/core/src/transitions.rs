//! Allowed-transition table
//!
//! The lifecycle graph is static data: a flat table from current state to
//! the targets it may move to. Validation is a lookup, nothing more.
//!
//! ```text
//! created ──▶ active ◀──▶ interrupted
//!               │              │
//!               └──▶ finished ◀┘
//! ```
//!
//! Self-transitions are never allowed, and `finished` has no outgoing edge.

use crate::error::{Error, Result};
use crate::types::StreamState;

/// Current state → allowed targets
static TRANSITIONS: [(StreamState, &[StreamState]); 4] = [
    (StreamState::Created, &[StreamState::Active]),
    (
        StreamState::Active,
        &[StreamState::Interrupted, StreamState::Finished],
    ),
    (
        StreamState::Interrupted,
        &[StreamState::Active, StreamState::Finished],
    ),
    (StreamState::Finished, &[]),
];

/// Targets reachable from `current` in one validated step
pub fn allowed_targets(current: StreamState) -> &'static [StreamState] {
    TRANSITIONS
        .iter()
        .find(|(from, _)| *from == current)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Whether `current → requested` is an edge of the table
#[inline]
pub fn is_allowed(current: StreamState, requested: StreamState) -> bool {
    allowed_targets(current).contains(&requested)
}

/// Validate a transition, returning `InvalidTransition` with the current
/// state when the pair is not in the table.
pub fn validate_transition(current: StreamState, requested: StreamState) -> Result<()> {
    if is_allowed(current, requested) {
        Ok(())
    } else {
        Err(Error::InvalidTransition { current, requested })
    }
}
