//! Error Precedence Tests
//!
//! NotFound before InvalidTransition before Conflict; collaborator failures
//! are never reported as any of the three.

use crate::common::*;
use std::sync::Arc;
use streamstate::{StreamFilter, UpdateResult};

#[test]
fn unknown_id_is_not_found_for_get_and_set() {
    let store = memory_store();
    let id = StreamId::new();

    assert!(matches!(store.get_stream(&id), Err(Error::NotFound(missing)) if missing == id));
    for target in ALL_STATES {
        let err = store.set_state(&id, target).unwrap_err();
        assert!(err.is_not_found(), "{:?}", err);
        assert!(!err.is_conflict());
    }
}

#[test]
fn illegal_transition_wins_over_race_check() {
    // Lined-up readers on a finished stream: nobody reaches the write, so
    // nobody can see Conflict.
    let (store, rendezvous) = rendezvous_store();
    let id = seed(&store, StreamState::Finished);

    rendezvous.arm(2);
    let (a, b) = std::thread::scope(|s| {
        let a = s.spawn(|| store.set_state(&id, StreamState::Active));
        let b = s.spawn(|| store.set_state(&id, StreamState::Interrupted));
        (a.join().unwrap(), b.join().unwrap())
    });

    assert!(a.unwrap_err().is_invalid_transition());
    assert!(b.unwrap_err().is_invalid_transition());
    assert_eq!(store.metrics().conflicts, 0);
}

#[test]
fn conflict_display_mentions_race() {
    let err = Error::Conflict {
        id: StreamId::new(),
        expected: StreamState::Active,
    };
    assert!(err.to_string().contains("race detected"));
    assert!(err.is_retryable());
}

/// Reads work, writes time out
struct TimingOut(MemoryCollection);

impl StreamCollection for TimingOut {
    fn insert(&self, initial: StreamState) -> streamstate::Result<Stream> {
        self.0.insert(initial)
    }

    fn find_one(&self, filter: &StreamFilter) -> streamstate::Result<Option<Stream>> {
        self.0.find_one(filter)
    }

    fn update_one(&self, _: &StreamFilter, _: StreamState) -> streamstate::Result<UpdateResult> {
        Err(Error::Unavailable("write timed out".to_string()))
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

#[test]
fn collaborator_timeout_is_unavailable() {
    let store = StateStore::new(Arc::new(TimingOut(MemoryCollection::new())));
    let id = store.collection().insert(StreamState::Active).unwrap().id;

    let err = store.set_state(&id, StreamState::Finished).unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)));
    assert!(!err.is_conflict() && !err.is_not_found() && !err.is_retryable());

    // Illegal transitions are still caught before the write is attempted.
    let err = store.set_state(&id, StreamState::Created).unwrap_err();
    assert!(err.is_invalid_transition());
}
