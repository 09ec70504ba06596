//! Validated Transition Tests
//!
//! Every (current, requested) pair through the store agrees with the table.

use crate::common::*;
use streamstate::{allowed_targets, is_allowed};

#[test]
fn store_agrees_with_table_for_every_pair() {
    let store = memory_store();

    for current in ALL_STATES {
        for requested in ALL_STATES {
            let id = seed(&store, current);
            let result = store.set_state(&id, requested);

            if is_allowed(current, requested) {
                let stream = result.unwrap_or_else(|e| {
                    panic!("{} -> {} should commit, got {}", current, requested, e)
                });
                assert_eq!(stream.state, requested);
                assert_eq!(state_of(&store, &id), requested);
            } else {
                match result {
                    Err(Error::InvalidTransition {
                        current: seen,
                        requested: asked,
                    }) => {
                        assert_eq!(seen, current);
                        assert_eq!(asked, requested);
                    }
                    other => panic!(
                        "{} -> {} should be rejected, got {:?}",
                        current, requested, other
                    ),
                }
                assert_eq!(state_of(&store, &id), current);
            }
        }
    }
}

#[test]
fn exactly_five_edges() {
    let edges: usize = ALL_STATES
        .iter()
        .map(|state| allowed_targets(*state).len())
        .sum();
    assert_eq!(edges, 5);
}

#[test]
fn finished_seeded_stream_rejects_active() {
    let store = memory_store();
    let id = seed(&store, StreamState::Finished);

    let err = store.set_state(&id, StreamState::Active).unwrap_err();
    assert!(err.is_invalid_transition());
    assert!(err.to_string().contains("current state: finished"));
    assert_eq!(state_of(&store, &id), StreamState::Finished);
}

#[test]
fn pause_resume_cycles_then_finish() {
    let store = memory_store();
    let id = store.collection().insert(StreamState::Created).unwrap().id;

    store.set_state(&id, StreamState::Active).unwrap();
    for _ in 0..10 {
        store.set_state(&id, StreamState::Interrupted).unwrap();
        store.set_state(&id, StreamState::Active).unwrap();
    }
    store.set_state(&id, StreamState::Finished).unwrap();

    let stream = store.get_stream(&id).unwrap();
    assert_eq!(stream.state, StreamState::Finished);
    assert!(stream.state.is_terminal());
    assert_eq!(store.metrics().committed, 22);
}

#[test]
fn created_at_never_changes() {
    let store = memory_store();
    let created = store.collection().insert(StreamState::Created).unwrap();

    store.set_state(&created.id, StreamState::Active).unwrap();
    store
        .set_state_admin(&created.id, StreamState::Interrupted)
        .unwrap();

    assert_eq!(
        store.get_stream(&created.id).unwrap().created_at,
        created.created_at
    );
}
