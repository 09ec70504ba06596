//! WAL writer with durability mode support.
//!
//! The writer appends framed records to a single log file and fsyncs
//! according to the configured mode.
//!
//! A failed append never leaves its record behind: the file is cut back to
//! the length it had before the append. If that cut fails, or an fsync
//! fails, the writer is poisoned and refuses every later append.

use super::record::WalRecord;
use super::DurabilityMode;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, warn};

/// Cumulative WAL operation counters.
///
/// These counters accumulate over the lifetime of the WalWriter
/// and are never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalCounters {
    /// Total WAL record appends
    pub wal_appends: u64,
    /// Total durability barrier (fsync) calls
    pub sync_calls: u64,
    /// Total bytes written to the log
    pub bytes_written: u64,
    /// Total nanoseconds spent in fsync calls
    pub sync_nanos: u64,
}

/// Byte sink behind a [`WalWriter`]
trait LogSink: Write + Send {
    fn sync_data(&self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl LogSink for File {
    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Append-only WAL writer.
pub struct WalWriter {
    sink: Box<dyn LogSink>,
    path: PathBuf,
    durability: DurabilityMode,
    writes_since_sync: usize,
    /// File length after the last successful append
    committed_len: u64,
    poisoned: bool,
    counters: WalCounters,
}

impl WalWriter {
    /// Open `path` for appending, creating it if missing.
    pub fn open(path: &Path, durability: DurabilityMode) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self::from_sink(Box::new(file), path, durability, len))
    }

    fn from_sink(
        sink: Box<dyn LogSink>,
        path: &Path,
        durability: DurabilityMode,
        committed_len: u64,
    ) -> Self {
        WalWriter {
            sink,
            path: path.to_path_buf(),
            durability,
            writes_since_sync: 0,
            committed_len,
            poisoned: false,
            counters: WalCounters::default(),
        }
    }

    /// Append a record to the WAL.
    ///
    /// The record is handed to the OS before returning; fsync follows the
    /// durability mode. On error the record is not in the log.
    pub fn append(&mut self, record: &WalRecord) -> io::Result<()> {
        self.check_poisoned()?;
        let bytes = record
            .to_bytes()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Err(e) = self.sink.write_all(&bytes) {
            self.rollback();
            return Err(e);
        }
        self.writes_since_sync += 1;

        if self.writes_since_sync >= self.durability.sync_every() {
            if let Err(e) = self.sync_pending() {
                self.rollback();
                self.poisoned = true;
                return Err(e);
            }
        }

        self.committed_len += bytes.len() as u64;
        self.counters.wal_appends += 1;
        self.counters.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// fsync everything written so far.
    pub fn sync(&mut self) -> io::Result<()> {
        self.check_poisoned()?;
        self.sync_pending().map_err(|e| {
            self.poisoned = true;
            e
        })
    }

    fn sync_pending(&mut self) -> io::Result<()> {
        if self.writes_since_sync == 0 {
            return Ok(());
        }
        let start = Instant::now();
        self.sink.sync_data()?;
        self.counters.sync_calls += 1;
        self.counters.sync_nanos += start.elapsed().as_nanos() as u64;
        self.writes_since_sync = 0;
        Ok(())
    }

    /// Cut the log back to the last successful append.
    fn rollback(&mut self) {
        match self.sink.truncate(self.committed_len) {
            Ok(()) => {
                warn!(
                    target: "streamstate::wal",
                    path = ?self.path,
                    len = self.committed_len,
                    "Rolled back failed WAL append"
                );
            }
            Err(e) => {
                self.poisoned = true;
                error!(
                    target: "streamstate::wal",
                    path = ?self.path,
                    error = %e,
                    "WAL rollback failed, refusing further appends"
                );
            }
        }
    }

    fn check_poisoned(&self) -> io::Result<()> {
        if self.poisoned {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "WAL '{}' is unusable after an earlier write failure",
                    self.path.display()
                ),
            ));
        }
        Ok(())
    }

    /// True once a failure has made the log unsafe to extend
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durability mode in effect
    pub fn durability(&self) -> DurabilityMode {
        self.durability
    }

    /// Snapshot of the cumulative counters
    pub fn counters(&self) -> WalCounters {
        self.counters.clone()
    }
}

impl Drop for WalWriter {
    fn drop(&mut self) {
        if self.poisoned {
            return;
        }
        if let Err(e) = self.sync_pending() {
            warn!(target: "streamstate::wal", path = ?self.path, error = %e, "final WAL sync failed");
        }
    }
}
