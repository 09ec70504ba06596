//! Admin Bypass Tests
//!
//! `set_state_admin` ignores the table and any precondition.

use crate::common::*;

#[test]
fn admin_sets_any_state_from_any_state() {
    let store = memory_store();

    for from in ALL_STATES {
        for to in ALL_STATES {
            let id = seed(&store, from);
            store.set_state_admin(&id, to).unwrap();
            assert_eq!(state_of(&store, &id), to, "{} -> {}", from, to);
        }
    }
}

#[test]
fn admin_revives_finished_stream() {
    let store = memory_store();
    let id = seed(&store, StreamState::Finished);

    store.set_state_admin(&id, StreamState::Active).unwrap();
    let stream = store.set_state(&id, StreamState::Interrupted).unwrap();
    assert_eq!(stream.state, StreamState::Interrupted);
}

#[test]
fn admin_same_state_is_ok() {
    let store = memory_store();
    let id = seed(&store, StreamState::Active);
    store.set_state_admin(&id, StreamState::Active).unwrap();
    assert_eq!(state_of(&store, &id), StreamState::Active);
}

#[test]
fn admin_does_not_count_as_transition() {
    let store = memory_store();
    let _id = seed(&store, StreamState::Active);

    let metrics = store.metrics();
    assert_eq!(metrics.attempts, 0);
    assert_eq!(metrics.committed, 0);
    assert_eq!(metrics.admin_writes, 1);
}

#[test]
fn admin_unknown_stream_is_not_found() {
    let store = memory_store();
    let err = store
        .set_state_admin(&StreamId::new(), StreamState::Created)
        .unwrap_err();
    assert!(err.is_not_found());
}
