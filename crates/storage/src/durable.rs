//! Write-ahead-logged stream collection
//!
//! `DurableCollection` keeps the working set in a [`MemoryCollection`] and
//! appends every mutation to `streams.wal` before it becomes visible.
//! Opening the collection replays the log.
//!
//! # Layout
//!
//! ```text
//! <dir>/
//! ├── .lock          (exclusive process lock)
//! └── streams.wal    (append-only log)
//! ```
//!
//! # Ordering
//!
//! The WAL append for an update runs while the document's shard entry is
//! held, so two updates of the same document are logged in the order they
//! were applied. Replay therefore reproduces the last applied state.

use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use streamstate_core::{
    Error, Result, Stream, StreamCollection, StreamFilter, StreamState, UpdateResult,
};
use tracing::{info, warn};

use crate::memory::MemoryCollection;
use crate::wal::record::MAX_RECORD_LEN;
use crate::wal::{
    self, DurabilityMode, ReadStopReason, WalCounters, WalOp, WalReaderError, WalRecord,
    WalWriter,
};

/// Log file name inside a collection directory
pub const WAL_FILE_NAME: &str = "streams.wal";

/// Lock file name inside a collection directory
pub const LOCK_FILE_NAME: &str = ".lock";

/// Largest tail recovery will discard: one record plus its length prefix
const MAX_TORN_BYTES: u64 = (MAX_RECORD_LEN + 4) as u64;

/// What recovery found when the collection was opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records replayed from the log
    pub records_replayed: usize,
    /// Documents present after replay
    pub streams: usize,
    /// Bytes of torn tail discarded
    pub torn_bytes: u64,
}

/// Stream collection persisted through a write-ahead log
pub struct DurableCollection {
    docs: MemoryCollection,
    wal: Mutex<WalWriter>,
    dir: PathBuf,
    recovery: RecoveryStats,
    // Held for the lifetime of the collection; dropping it releases the lock
    _lock: File,
}

impl DurableCollection {
    /// Open (or create) the collection stored in `dir`.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the directory cannot be created or another process
    ///   holds it open
    /// - `Corruption` if the log is damaged before its tail
    /// - `Io` for other file errors
    pub fn open(dir: &Path, durability: DurabilityMode) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            Error::unavailable(format!(
                "cannot create collection directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let lock = acquire_lock(dir)?;
        let wal_path = dir.join(WAL_FILE_NAME);
        let docs = MemoryCollection::new();
        let recovery = recover(&wal_path, &docs)?;

        info!(
            target: "streamstate::wal",
            path = ?wal_path,
            records_replayed = recovery.records_replayed,
            streams = recovery.streams,
            torn_bytes = recovery.torn_bytes,
            durability = durability.description(),
            "Recovery complete"
        );

        let writer = WalWriter::open(&wal_path, durability)?;

        Ok(DurableCollection {
            docs,
            wal: Mutex::new(writer),
            dir: dir.to_path_buf(),
            recovery,
            _lock: lock,
        })
    }

    /// Directory this collection lives in
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Statistics from the replay performed at open
    pub fn recovery_stats(&self) -> &RecoveryStats {
        &self.recovery
    }

    /// Cumulative WAL counters
    pub fn wal_counters(&self) -> WalCounters {
        self.wal.lock().counters()
    }

    /// Force an fsync of everything appended so far
    pub fn sync(&self) -> Result<()> {
        Ok(self.wal.lock().sync()?)
    }

    fn log(&self, op: WalOp) -> Result<()> {
        Ok(self.wal.lock().append(&WalRecord::new(op))?)
    }
}

impl StreamCollection for DurableCollection {
    fn insert(&self, initial: StreamState) -> Result<Stream> {
        self.docs
            .insert_with(Stream::new(initial), |stream| {
                self.log(WalOp::Insert(stream.clone()))
            })
    }

    fn find_one(&self, filter: &StreamFilter) -> Result<Option<Stream>> {
        self.docs.find_one(filter)
    }

    fn update_one(&self, filter: &StreamFilter, state: StreamState) -> Result<UpdateResult> {
        self.docs.update_with(filter, state, |stream| {
            self.log(WalOp::SetState {
                id: stream.id,
                state: stream.state,
            })
        })
    }

    fn len(&self) -> usize {
        self.docs.len()
    }
}

fn acquire_lock(dir: &Path) -> Result<File> {
    let lock_path = dir.join(LOCK_FILE_NAME);
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_path)
        .map_err(|e| Error::unavailable(format!("failed to open lock file: {}", e)))?;
    lock_file.try_lock_exclusive().map_err(|_| {
        Error::unavailable(format!(
            "collection at '{}' is already in use by another process",
            dir.display()
        ))
    })?;
    Ok(lock_file)
}

fn recover(wal_path: &Path, docs: &MemoryCollection) -> Result<RecoveryStats> {
    let result = wal::read_all(wal_path).map_err(|e| match e {
        WalReaderError::Io(io) => Error::Io(io),
        damaged => Error::Corruption(format!("{} in '{}'", damaged, wal_path.display())),
    })?;

    let torn_bytes = result.torn_bytes();
    let stop_reason = result.stop_reason.clone();
    let records_replayed = result.ops.len();
    for (index, op) in result.ops.into_iter().enumerate() {
        match op {
            WalOp::Insert(stream) => docs.restore(stream),
            WalOp::SetState { id, state } => {
                if !docs.restore_state(&id, state) {
                    return Err(Error::Corruption(format!(
                        "record {} sets state on unknown stream {}",
                        index, id
                    )));
                }
            }
        }
    }

    match stop_reason {
        ReadStopReason::EndOfData => {}
        ReadStopReason::PartialRecord { offset } => {
            // A torn write leaves at most one record's worth of bytes behind.
            if torn_bytes > MAX_TORN_BYTES {
                return Err(Error::Corruption(format!(
                    "{} bytes of unreadable data at offset {} in '{}'",
                    torn_bytes,
                    offset,
                    wal_path.display()
                )));
            }
            warn!(
                target: "streamstate::wal",
                path = ?wal_path,
                offset,
                torn_bytes,
                "Discarding torn record at end of WAL"
            );
            let file = OpenOptions::new().write(true).open(wal_path)?;
            file.set_len(offset)?;
            file.sync_all()?;
        }
    }

    Ok(RecoveryStats {
        records_replayed,
        streams: docs.len(),
        torn_bytes,
    })
}
