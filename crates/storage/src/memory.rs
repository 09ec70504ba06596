//! In-memory stream collection
//!
//! Documents live in a DashMap keyed by StreamId.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default, lock-free reads
//! - FxHasher: fast non-crypto hash for O(1) lookups
//! - `update_one` evaluates the filter and writes while holding the
//!   document's shard entry, so a conditional update is atomic with respect
//!   to every other operation on that document
//!
//! Different streams hashing to different shards never contend.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use streamstate_core::{
    Error, Result, Stream, StreamCollection, StreamFilter, StreamId, StreamState, UpdateResult,
};
use tracing::trace;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Sharded in-memory document collection
#[derive(Debug)]
pub struct MemoryCollection {
    docs: DashMap<StreamId, Stream, FxBuildHasher>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            docs: DashMap::with_hasher(FxBuildHasher::default()),
        }
    }

    /// Insert a fully-formed document, running `persist` first.
    ///
    /// The document only becomes visible once `persist` succeeds.
    pub(crate) fn insert_with<F>(&self, stream: Stream, persist: F) -> Result<Stream>
    where
        F: FnOnce(&Stream) -> Result<()>,
    {
        match self.docs.entry(stream.id) {
            Entry::Occupied(_) => Err(Error::invalid_input(format!(
                "stream {} already exists",
                stream.id
            ))),
            Entry::Vacant(slot) => {
                persist(&stream)?;
                slot.insert(stream.clone());
                Ok(stream)
            }
        }
    }

    /// Filtered update, running `persist` with the new document before it
    /// replaces the stored one.
    ///
    /// The shard entry stays locked from filter evaluation until the write
    /// lands, so callers observe the update atomically. `persist` is skipped
    /// when the state would not change.
    pub(crate) fn update_with<F>(
        &self,
        filter: &StreamFilter,
        state: StreamState,
        persist: F,
    ) -> Result<UpdateResult>
    where
        F: FnOnce(&Stream) -> Result<()>,
    {
        let mut entry = match self.docs.get_mut(&filter.id) {
            Some(entry) => entry,
            None => return Ok(UpdateResult::unmatched()),
        };

        if !filter.matches(&entry) {
            trace!(target: "streamstate::storage", id = %filter.id, "update filter did not match");
            return Ok(UpdateResult::unmatched());
        }

        if entry.state == state {
            return Ok(UpdateResult::applied(entry.value().clone(), false));
        }

        let mut updated = entry.value().clone();
        updated.state = state;
        persist(&updated)?;
        *entry = updated.clone();
        Ok(UpdateResult::applied(updated, true))
    }

    /// Put a document back during recovery, replacing any existing copy
    pub(crate) fn restore(&self, stream: Stream) {
        self.docs.insert(stream.id, stream);
    }

    /// Overwrite a document's state during recovery
    ///
    /// Returns false if the document is unknown.
    pub(crate) fn restore_state(&self, id: &StreamId, state: StreamState) -> bool {
        match self.docs.get_mut(id) {
            Some(mut entry) => {
                entry.state = state;
                true
            }
            None => false,
        }
    }

    /// Snapshot of every document, in no particular order
    pub fn documents(&self) -> Vec<Stream> {
        self.docs.iter().map(|entry| entry.value().clone()).collect()
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamCollection for MemoryCollection {
    fn insert(&self, initial: StreamState) -> Result<Stream> {
        self.insert_with(Stream::new(initial), |_| Ok(()))
    }

    fn find_one(&self, filter: &StreamFilter) -> Result<Option<Stream>> {
        Ok(self
            .docs
            .get(&filter.id)
            .filter(|doc| filter.matches(doc))
            .map(|doc| doc.value().clone()))
    }

    fn update_one(&self, filter: &StreamFilter, state: StreamState) -> Result<UpdateResult> {
        self.update_with(filter, state, |_| Ok(()))
    }

    fn len(&self) -> usize {
        self.docs.len()
    }
}
