//! Persistence contract
//!
//! The state store never touches storage directly. It talks to a
//! [`StreamCollection`]: a document collection that can do point reads and
//! atomic single-document updates guarded by a filter. Swapping the
//! implementation (in-memory, write-ahead-logged, remote) does not change
//! the store.

use crate::error::Result;
use crate::types::{Stream, StreamId, StreamState};

/// Document filter for reads and updates
///
/// Always matches on `id`. When `state` is set, the document must also
/// currently hold that state; this is the optimistic-concurrency guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFilter {
    /// Identifier to match
    pub id: StreamId,
    /// Expected current state, if the operation is conditional
    pub state: Option<StreamState>,
}

impl StreamFilter {
    /// Match on identifier only
    pub fn by_id(id: StreamId) -> Self {
        Self { id, state: None }
    }

    /// Match on identifier and an expected current state
    pub fn by_id_and_state(id: StreamId, state: StreamState) -> Self {
        Self {
            id,
            state: Some(state),
        }
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, stream: &Stream) -> bool {
        stream.id == self.id && self.state.map_or(true, |expected| stream.state == expected)
    }
}

/// Outcome of an update
///
/// `matched == 0` means no document satisfied the filter at the moment the
/// update was applied. `document` is the post-update snapshot when a
/// document matched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateResult {
    /// Documents that satisfied the filter (0 or 1)
    pub matched: u64,
    /// Documents whose stored state actually changed
    pub modified: u64,
    /// Document after the update, if one matched
    pub document: Option<Stream>,
}

impl UpdateResult {
    /// Nothing matched the filter
    pub fn unmatched() -> Self {
        Self::default()
    }

    /// One document matched; `modified` tells whether its state changed
    pub fn applied(document: Stream, modified: bool) -> Self {
        Self {
            matched: 1,
            modified: u64::from(modified),
            document: Some(document),
        }
    }
}

/// Document collection holding stream records
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). `update_one` must evaluate the
/// filter and apply the write as one atomic step with respect to every
/// other call on the same document; that atomicity is the only thing the
/// state store relies on to serialize racing writers.
pub trait StreamCollection: Send + Sync {
    /// Insert a new document in `initial` state
    ///
    /// The collection assigns the identifier and creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot persist the document.
    fn insert(&self, initial: StreamState) -> Result<Stream>;

    /// Point read of the document matching `filter`
    ///
    /// Returns `None` if no document satisfies the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is unreachable.
    fn find_one(&self, filter: &StreamFilter) -> Result<Option<Stream>>;

    /// Atomically set `state` on the single document matching `filter`
    ///
    /// # Errors
    ///
    /// Returns an error if the collection is unreachable or the write could
    /// not be made durable. A filter that matches nothing is not an error.
    fn update_one(&self, filter: &StreamFilter, state: StreamState) -> Result<UpdateResult>;

    /// Number of documents
    fn len(&self) -> usize;

    /// True if the collection holds no documents
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
