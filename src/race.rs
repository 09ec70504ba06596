//! Concurrent-transition race harness
//!
//! Repeats one scenario `trials` times against a single stream:
//!
//! 1. Admin-set the stream to `active`
//! 2. Sleep for `settle`
//! 3. Two threads call `set_state(interrupted)` and `set_state(finished)`
//!    at the same moment
//! 4. Read the stream back; it must be `interrupted` or `finished`
//!
//! Both targets are legal from `active`. When both racers read `active`,
//! exactly one commits and the other sees `Conflict`. With `rendezvous` on,
//! the two reads are lined up at a barrier so that is every trial and the
//! conflict count equals the trial count.
//!
//! Without the rendezvous a racer may read after the other one committed. It
//! then either gets `InvalidTransition` (nothing leaves `finished`) or
//! commits `interrupted → finished` on top. Both are serialized outcomes, not
//! races, and are tallied separately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use streamstate_core::{Error, Result, Stream, StreamCollection, StreamId, StreamState};
use streamstate_engine::StateStore;
use streamstate_storage::ReadRendezvous;
use tracing::{debug, info};

/// Trials run by the verification program
pub const DEFAULT_TRIALS: u64 = 30;

/// Pause between the admin reset and the race
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

/// Race harness settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceConfig {
    /// Number of trials
    pub trials: u64,
    /// Sleep after each admin reset
    pub settle: Duration,
    /// Line up both racers' reads before either writes
    pub rendezvous: bool,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            settle: DEFAULT_SETTLE,
            rendezvous: true,
        }
    }
}

/// Outcome tallies across all trials
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceReport {
    /// Trials run
    pub trials: u64,
    /// Racer calls that returned `Conflict`
    pub conflicts: u64,
    /// Trials won by the `interrupted` racer
    pub interrupted_wins: u64,
    /// Trials won by the `finished` racer
    pub finished_wins: u64,
    /// Racer calls rejected by the transition table (read a later state)
    pub rejected: u64,
    /// Trials where both racers committed one after the other
    pub both_committed: u64,
}

impl RaceReport {
    /// One-line verdict printed by `streamstate race`
    pub fn summary(&self) -> String {
        format!(
            "Test is passed. Concurrent error rate is: {} / {}",
            self.conflicts, self.trials
        )
    }
}

#[derive(Default)]
struct Tally {
    conflicts: AtomicU64,
    interrupted_wins: AtomicU64,
    finished_wins: AtomicU64,
    rejected: AtomicU64,
    both_committed: AtomicU64,
}

impl Tally {
    fn report(&self, trials: u64) -> RaceReport {
        RaceReport {
            trials,
            conflicts: self.conflicts.load(Ordering::Relaxed),
            interrupted_wins: self.interrupted_wins.load(Ordering::Relaxed),
            finished_wins: self.finished_wins.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            both_committed: self.both_committed.load(Ordering::Relaxed),
        }
    }
}

/// Run the race scenario against stream `id` in `collection`
///
/// # Errors
///
/// - `NotFound` if `id` does not exist
/// - `Corruption` if a trial ends in a state other than `interrupted` or
///   `finished`
/// - any racer error other than `Conflict` or `InvalidTransition`, unchanged
pub fn run_race(
    collection: Arc<dyn StreamCollection>,
    id: StreamId,
    config: &RaceConfig,
) -> Result<RaceReport> {
    let rendezvous = Arc::new(ReadRendezvous::new(collection));
    let store = StateStore::new(rendezvous.clone());
    let tally = Tally::default();

    for trial in 0..config.trials {
        store.set_state_admin(&id, StreamState::Active)?;
        thread::sleep(config.settle);

        if config.rendezvous {
            rendezvous.arm(2);
        }

        let (interrupted, finished) = thread::scope(|s| {
            let a = s.spawn(|| store.set_state(&id, StreamState::Interrupted));
            let b = s.spawn(|| store.set_state(&id, StreamState::Finished));
            (join_racer(a), join_racer(b))
        });
        rendezvous.disarm();

        let interrupted = settle_racer(interrupted?, &tally)?;
        let finished = settle_racer(finished?, &tally)?;
        match (interrupted, finished) {
            (true, true) => {
                tally.both_committed.fetch_add(1, Ordering::Relaxed);
            }
            (true, false) => {
                tally.interrupted_wins.fetch_add(1, Ordering::Relaxed);
            }
            (false, true) => {
                tally.finished_wins.fetch_add(1, Ordering::Relaxed);
            }
            (false, false) => {}
        }

        let state = store.get_stream(&id)?.state;
        if !matches!(state, StreamState::Interrupted | StreamState::Finished) {
            return Err(Error::Corruption(format!(
                "stream {} ended trial {} in state {}",
                id, trial, state
            )));
        }
        debug!(target: "streamstate::race", trial, state = %state, "Trial complete");
    }

    let report = tally.report(config.trials);
    info!(
        target: "streamstate::race",
        trials = report.trials,
        conflicts = report.conflicts,
        interrupted_wins = report.interrupted_wins,
        finished_wins = report.finished_wins,
        "Race complete"
    );
    Ok(report)
}

type Racer<'scope> = thread::ScopedJoinHandle<'scope, Result<Stream>>;

fn join_racer(handle: Racer<'_>) -> Result<Result<Stream>> {
    handle
        .join()
        .map_err(|_| Error::Corruption("racer thread panicked".to_string()))
}

/// True if the racer committed; collaborator errors pass up
fn settle_racer(outcome: Result<Stream>, tally: &Tally) -> Result<bool> {
    match outcome {
        Ok(_) => Ok(true),
        Err(e) if e.is_conflict() => {
            tally.conflicts.fetch_add(1, Ordering::Relaxed);
            Ok(false)
        }
        Err(e) if e.is_invalid_transition() => {
            tally.rejected.fetch_add(1, Ordering::Relaxed);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
