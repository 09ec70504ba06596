//! At-Most-One-Winner Tests
//!
//! Concurrent `set_state` calls that read the same precondition:
//! - Two racers, legal but different targets: one success, one Conflict
//! - Many racers lined up on one read: exactly one success
//! - Unaligned racers: never two commits out of the same precondition
//! - Final state always equals a winner's target

use crate::common::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn race_pair(
    precondition: StreamState,
    a: StreamState,
    b: StreamState,
) -> (StreamState, Result<Stream, Error>, Result<Stream, Error>) {
    let (store, rendezvous) = rendezvous_store();
    let id = seed(&store, precondition);

    rendezvous.arm(2);
    let (ra, rb) = thread::scope(|s| {
        let ha = s.spawn(|| store.set_state(&id, a));
        let hb = s.spawn(|| store.set_state(&id, b));
        (ha.join().unwrap(), hb.join().unwrap())
    });
    (state_of(&store, &id), ra, rb)
}

// ============================================================================
// Two racers
// ============================================================================

#[test]
fn two_racers_from_active_one_wins_one_conflicts() {
    let (final_state, a, b) = race_pair(
        StreamState::Active,
        StreamState::Interrupted,
        StreamState::Finished,
    );

    match (a, b) {
        (Ok(winner), Err(Error::Conflict { expected, .. }))
        | (Err(Error::Conflict { expected, .. }), Ok(winner)) => {
            assert_eq!(expected, StreamState::Active);
            assert_eq!(final_state, winner.state);
        }
        other => panic!("Expected one success and one Conflict, got {:?}", other),
    }
}

#[test]
fn two_racers_from_interrupted_one_wins_one_conflicts() {
    let (final_state, a, b) = race_pair(
        StreamState::Interrupted,
        StreamState::Active,
        StreamState::Finished,
    );

    let (winner, loser) = match (a, b) {
        (Ok(w), Err(l)) | (Err(l), Ok(w)) => (w, l),
        other => panic!("Expected one success and one failure, got {:?}", other),
    };
    assert!(loser.is_conflict(), "{:?}", loser);
    assert_eq!(final_state, winner.state);
}

#[test]
fn two_racers_same_target_one_wins() {
    let (final_state, a, b) = race_pair(
        StreamState::Active,
        StreamState::Finished,
        StreamState::Finished,
    );

    assert_eq!(final_state, StreamState::Finished);
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(loser.unwrap_err().is_conflict());
}

// ============================================================================
// Many racers
// ============================================================================

#[test]
fn many_aligned_racers_exactly_one_wins() {
    const RACERS: usize = 16;
    let (store, rendezvous) = rendezvous_store();
    let id = seed(&store, StreamState::Active);

    let wins = AtomicU64::new(0);
    let conflicts = AtomicU64::new(0);

    rendezvous.arm(RACERS);
    thread::scope(|s| {
        for i in 0..RACERS {
            let store = &store;
            let wins = &wins;
            let conflicts = &conflicts;
            let target = if i % 2 == 0 {
                StreamState::Interrupted
            } else {
                StreamState::Finished
            };
            s.spawn(move || match store.set_state(&id, target) {
                Ok(_) => {
                    wins.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) if e.is_conflict() => {
                    conflicts.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => panic!("unexpected error: {}", e),
            });
        }
    });

    assert_eq!(wins.load(Ordering::Relaxed), 1);
    assert_eq!(conflicts.load(Ordering::Relaxed), RACERS as u64 - 1);
    assert!(!rendezvous.is_armed());
    assert_eq!(store.metrics().committed, 1);
}

#[test]
fn unaligned_racers_never_commit_twice_to_terminal() {
    // Everyone wants finished. After the first commit every later reader
    // sees finished and is rejected; earlier readers get Conflict.
    const RACERS: usize = 12;
    let store = memory_store();
    let id = seed(&store, StreamState::Active);
    let barrier = Arc::new(Barrier::new(RACERS));
    let wins = AtomicU64::new(0);

    thread::scope(|s| {
        for _ in 0..RACERS {
            let barrier = Arc::clone(&barrier);
            let store = &store;
            let wins = &wins;
            s.spawn(move || {
                barrier.wait();
                match store.set_state(&id, StreamState::Finished) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => assert!(
                        e.is_conflict() || e.is_invalid_transition(),
                        "unexpected error: {}",
                        e
                    ),
                }
            });
        }
    });

    assert_eq!(wins.load(Ordering::Relaxed), 1);
    assert_eq!(state_of(&store, &id), StreamState::Finished);
}

// ============================================================================
// No lost or partial updates
// ============================================================================

#[test]
fn final_state_is_a_racer_target_across_many_streams() {
    let store = memory_store();
    let ids: Vec<StreamId> = (0..64).map(|_| seed(&store, StreamState::Active)).collect();
    let barrier = Barrier::new(4);

    let committed: Vec<Vec<(StreamId, StreamState)>> = thread::scope(|s| {
        let handles: Vec<_> = [
            StreamState::Interrupted,
            StreamState::Finished,
            StreamState::Interrupted,
            StreamState::Finished,
        ]
        .into_iter()
        .map(|target| {
            let store = &store;
            let ids = &ids;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                ids.iter()
                    .filter_map(|id| store.set_state(id, target).ok().map(|st| (*id, st.state)))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for id in &ids {
        let final_state = state_of(&store, id);
        assert!(
            matches!(final_state, StreamState::Interrupted | StreamState::Finished),
            "{} ended in {}",
            id,
            final_state
        );
        // The last commit on each stream is the persisted state.
        let commits: Vec<StreamState> = committed
            .iter()
            .flatten()
            .filter(|(cid, _)| cid == id)
            .map(|(_, st)| *st)
            .collect();
        assert!(!commits.is_empty());
        assert!(commits.contains(&final_state));
        if commits.len() > 1 {
            // Only interrupted → finished can stack on top of a win.
            assert_eq!(final_state, StreamState::Finished);
        }
    }
}
