//! State store: read-validate-write over a stream collection
//!
//! `set_state` follows the optimistic-concurrency protocol:
//!
//! 1. Point-read the current snapshot (`NotFound` if absent)
//! 2. Validate `snapshot.state → target` against the transition table
//! 3. Conditionally update the document matching `id` **and**
//!    `state == snapshot.state`
//! 4. Zero matches means another writer changed the state in between:
//!    return `Conflict`
//!
//! The store holds no locks and never retries. Serialization of racing
//! writers is entirely the collection's atomic conditional update; what to
//! do after a `Conflict` is the caller's decision.
//!
//! `set_state_admin` is the unvalidated bypass for seeding and resets. It
//! must not run concurrently with `set_state` on the same stream, or it can
//! persist a state the transition graph cannot reach.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use streamstate_core::{
    Error, Result, Stream, StreamCollection, StreamFilter, StreamId, StreamState,
};
use tracing::{debug, info, warn};

/// Snapshot of the store's outcome counters
///
/// Counts are observational only and use Relaxed ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    /// `set_state` calls made
    pub attempts: u64,
    /// Transitions committed
    pub committed: u64,
    /// Lost races
    pub conflicts: u64,
    /// Rejected by the transition table
    pub invalid_transitions: u64,
    /// Unknown stream identifiers (reads and writes)
    pub not_found: u64,
    /// Administrative overwrites applied
    pub admin_writes: u64,
}

#[derive(Default)]
struct Counters {
    attempts: AtomicU64,
    committed: AtomicU64,
    conflicts: AtomicU64,
    invalid_transitions: AtomicU64,
    not_found: AtomicU64,
    admin_writes: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StoreMetrics {
        StoreMetrics {
            attempts: self.attempts.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            invalid_transitions: self.invalid_transitions.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            admin_writes: self.admin_writes.load(Ordering::Relaxed),
        }
    }
}

/// Lifecycle store for streams
///
/// Cheap to clone; clones share the collection and the metrics.
///
/// # Example
///
/// ```rust,ignore
/// use streamstate_engine::StateStore;
///
/// let store = StateStore::new(collection);
/// store.set_state_admin(&id, StreamState::Active)?;
///
/// match store.set_state(&id, StreamState::Finished) {
///     Ok(stream) => assert_eq!(stream.state, StreamState::Finished),
///     Err(e) if e.is_conflict() => { /* someone else moved it first */ }
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Clone)]
pub struct StateStore {
    collection: Arc<dyn StreamCollection>,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore").finish_non_exhaustive()
    }
}

impl StateStore {
    /// Create a store over `collection`
    pub fn new(collection: Arc<dyn StreamCollection>) -> Self {
        Self {
            collection,
            counters: Arc::new(Counters::default()),
        }
    }

    /// The underlying collection (creation of streams happens there)
    pub fn collection(&self) -> &Arc<dyn StreamCollection> {
        &self.collection
    }

    /// Outcome counters since this store was created
    pub fn metrics(&self) -> StoreMetrics {
        self.counters.snapshot()
    }

    /// Read the current persisted snapshot
    ///
    /// # Errors
    ///
    /// `NotFound` if no document has this identifier.
    pub fn get_stream(&self, id: &StreamId) -> Result<Stream> {
        match self.collection.find_one(&StreamFilter::by_id(*id))? {
            Some(stream) => Ok(stream),
            None => {
                Counters::bump(&self.counters.not_found);
                debug!(target: "streamstate::store", id = %id, "Stream not found");
                Err(Error::NotFound(*id))
            }
        }
    }

    /// Move a stream to `target` through the validated, race-checked path
    ///
    /// # Errors
    ///
    /// - `NotFound` if the stream does not exist
    /// - `InvalidTransition` if the table rejects `current → target`
    /// - `Conflict` if the state changed between the read and the write
    /// - collaborator failures propagate unchanged
    pub fn set_state(&self, id: &StreamId, target: StreamState) -> Result<Stream> {
        Counters::bump(&self.counters.attempts);

        let mut stream = self.get_stream(id)?;
        let observed = stream.state;

        if let Err(e) = stream.transition_to(target) {
            Counters::bump(&self.counters.invalid_transitions);
            debug!(
                target: "streamstate::store",
                id = %id,
                current = %observed,
                requested = %target,
                "Transition rejected"
            );
            return Err(e);
        }

        let filter = StreamFilter::by_id_and_state(*id, observed);
        let result = self.collection.update_one(&filter, target)?;

        if result.matched == 0 || result.modified == 0 {
            Counters::bump(&self.counters.conflicts);
            warn!(
                target: "streamstate::store",
                id = %id,
                expected = %observed,
                requested = %target,
                "State changed since read, transition not applied"
            );
            return Err(Error::Conflict {
                id: *id,
                expected: observed,
            });
        }

        Counters::bump(&self.counters.committed);
        info!(
            target: "streamstate::store",
            id = %id,
            from = %observed,
            to = %target,
            "Transition committed"
        );
        Ok(result.document.unwrap_or(stream))
    }

    /// Overwrite a stream's state without validation or precondition
    ///
    /// For initialization and resets only. Never call this concurrently with
    /// `set_state` on the same stream.
    ///
    /// # Errors
    ///
    /// `NotFound` if the stream does not exist.
    pub fn set_state_admin(&self, id: &StreamId, state: StreamState) -> Result<()> {
        let result = self
            .collection
            .update_one(&StreamFilter::by_id(*id), state)?;

        if result.matched == 0 {
            Counters::bump(&self.counters.not_found);
            return Err(Error::NotFound(*id));
        }

        Counters::bump(&self.counters.admin_writes);
        debug!(target: "streamstate::store", id = %id, state = %state, "Admin state overwrite");
        Ok(())
    }
}
