//! Seed-and-Race Scenario Tests
//!
//! The repeated scenario: admin-set to active, race interrupted against
//! finished, read back. With reads lined up, every trial is a conflict.

use crate::common::*;
use std::sync::Arc;
use std::time::Duration;
use streamstate::{run_race, RaceConfig};

fn config(trials: u64, rendezvous: bool) -> RaceConfig {
    RaceConfig {
        trials,
        settle: Duration::from_millis(1),
        rendezvous,
    }
}

#[test]
fn thirty_trials_conflict_every_time() {
    let collection: Arc<dyn StreamCollection> = Arc::new(MemoryCollection::new());
    let id = collection.insert(StreamState::Created).unwrap().id;

    let report = run_race(collection, id, &config(30, true)).unwrap();

    assert_eq!(report.trials, 30);
    assert_eq!(report.conflicts, 30);
    assert_eq!(report.interrupted_wins + report.finished_wins, 30);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.both_committed, 0);
    assert_eq!(
        report.summary(),
        "Test is passed. Concurrent error rate is: 30 / 30"
    );
}

#[test]
fn race_leaves_winner_state_persisted() {
    let collection: Arc<dyn StreamCollection> = Arc::new(MemoryCollection::new());
    let id = collection.insert(StreamState::Created).unwrap().id;

    run_race(collection.clone(), id, &config(3, true)).unwrap();

    let store = StateStore::new(collection);
    assert!(matches!(
        state_of(&store, &id),
        StreamState::Interrupted | StreamState::Finished
    ));
}

#[test]
fn race_against_durable_store_then_reopen() {
    let dir = TestDir::new();
    let (id, last) = {
        let store = dir.open();
        let id = store.collection().insert(StreamState::Created).unwrap().id;
        run_race(store.collection().clone(), id, &config(10, true)).unwrap();
        (id, state_of(&store, &id))
    };

    let store = dir.reopen();
    assert_eq!(state_of(&store, &id), last);
}

#[test]
fn race_on_unknown_stream_fails_fast() {
    let collection: Arc<dyn StreamCollection> = Arc::new(MemoryCollection::new());
    let err = run_race(collection, StreamId::new(), &config(30, true)).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn unaligned_race_still_ends_in_racer_state() {
    let collection: Arc<dyn StreamCollection> = Arc::new(MemoryCollection::new());
    let id = collection.insert(StreamState::Created).unwrap().id;

    let report = run_race(collection, id, &config(30, false)).unwrap();

    let calls = report.conflicts
        + report.rejected
        + report.interrupted_wins
        + report.finished_wins
        + 2 * report.both_committed;
    assert_eq!(calls, 60);
}
