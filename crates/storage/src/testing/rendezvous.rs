//! Read rendezvous decorator
//!
//! Wraps a collection so that, once armed, the next N point reads each wait
//! at a barrier after reading and before returning. Used to line up racing
//! writers deterministically: every racer has observed the same
//! precondition before any of them issues its conditional write.
//!
//! The decorator only delays reads. Updates go straight to the inner
//! collection, so the race itself is still decided by its atomic
//! conditional update.

use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use streamstate_core::{
    Result, Stream, StreamCollection, StreamFilter, StreamState, UpdateResult,
};

struct Gate {
    barrier: Arc<Barrier>,
    remaining: usize,
}

/// Collection decorator that can hold point reads at a barrier
pub struct ReadRendezvous {
    inner: Arc<dyn StreamCollection>,
    gate: Mutex<Option<Gate>>,
}

impl ReadRendezvous {
    /// Wrap `inner`; reads pass through until [`arm`](Self::arm) is called
    pub fn new(inner: Arc<dyn StreamCollection>) -> Self {
        Self {
            inner,
            gate: Mutex::new(None),
        }
    }

    /// Make the next `parties` reads wait for each other.
    ///
    /// Exactly `parties` reads must follow, otherwise the ones that arrived
    /// wait forever. `arm(0)` and `arm(1)` disarm.
    pub fn arm(&self, parties: usize) {
        let mut gate = self.gate.lock();
        *gate = (parties > 1).then(|| Gate {
            barrier: Arc::new(Barrier::new(parties)),
            remaining: parties,
        });
    }

    /// Drop any pending gate
    pub fn disarm(&self) {
        *self.gate.lock() = None;
    }

    /// True while armed reads are still expected
    pub fn is_armed(&self) -> bool {
        self.gate.lock().is_some()
    }

    /// The wrapped collection
    pub fn inner(&self) -> &Arc<dyn StreamCollection> {
        &self.inner
    }

    fn take_slot(&self) -> Option<Arc<Barrier>> {
        let mut guard = self.gate.lock();
        let gate = guard.as_mut()?;
        let barrier = Arc::clone(&gate.barrier);
        gate.remaining -= 1;
        if gate.remaining == 0 {
            *guard = None;
        }
        Some(barrier)
    }
}

impl StreamCollection for ReadRendezvous {
    fn insert(&self, initial: StreamState) -> Result<Stream> {
        self.inner.insert(initial)
    }

    fn find_one(&self, filter: &StreamFilter) -> Result<Option<Stream>> {
        let result = self.inner.find_one(filter);
        if let Some(barrier) = self.take_slot() {
            barrier.wait();
        }
        result
    }

    fn update_one(&self, filter: &StreamFilter, state: StreamState) -> Result<UpdateResult> {
        self.inner.update_one(filter, state)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
