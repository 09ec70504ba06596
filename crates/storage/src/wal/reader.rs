//! WAL reader for recovery and replay.
//!
//! Reads every complete record from a log file. A partial record at the
//! very end is the signature of a torn write and is reported, not treated
//! as corruption. Anything else that fails to parse is corruption.
//!
//! The CRC does not cover the length prefix, so a damaged `len` can make a
//! record look longer than the rest of the file. A short read only counts
//! as torn when no complete record follows it.

use super::record::{WalOp, WalRecord, WalRecordError};
use std::path::Path;

/// Why reading stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadStopReason {
    /// All bytes were consumed by complete records
    EndOfData,
    /// The file ends inside a record (torn write)
    PartialRecord {
        /// Offset where the partial record starts
        offset: u64,
    },
}

/// Result of reading a WAL file
#[derive(Debug, Clone)]
pub struct WalReadResult {
    /// Operations in log order
    pub ops: Vec<WalOp>,
    /// Byte offset just past the last complete record
    pub valid_end: u64,
    /// Total file length
    pub file_len: u64,
    /// Why reading stopped
    pub stop_reason: ReadStopReason,
}

impl WalReadResult {
    fn empty() -> Self {
        WalReadResult {
            ops: Vec::new(),
            valid_end: 0,
            file_len: 0,
            stop_reason: ReadStopReason::EndOfData,
        }
    }

    /// Bytes after `valid_end` that recovery must discard
    pub fn torn_bytes(&self) -> u64 {
        self.file_len - self.valid_end
    }
}

/// WAL reader errors
#[derive(Debug, thiserror::Error)]
pub enum WalReaderError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record before the tail failed validation
    #[error("corrupt WAL record at offset {offset}: {source}")]
    Corrupt {
        /// Offset of the bad record
        offset: u64,
        /// What was wrong with it
        source: WalRecordError,
    },

    /// A length prefix runs past a later, intact record
    #[error("WAL record at offset {offset} overruns a valid record at offset {next_valid}")]
    LengthOverrun {
        /// Offset of the record with the bad length
        offset: u64,
        /// Offset of the first intact record after it
        next_valid: u64,
    },
}

/// Read all records from `path`. A missing file reads as empty.
pub fn read_all(path: &Path) -> Result<WalReadResult, WalReaderError> {
    let buffer = match std::fs::read(path) {
        Ok(buffer) => buffer,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WalReadResult::empty()),
        Err(e) => return Err(e.into()),
    };
    read_from_bytes(&buffer)
}

/// Parse records from an in-memory copy of a log.
pub fn read_from_bytes(buffer: &[u8]) -> Result<WalReadResult, WalReaderError> {
    let mut ops = Vec::new();
    let mut offset = 0usize;
    let mut stop_reason = ReadStopReason::EndOfData;

    while offset < buffer.len() {
        match WalRecord::from_bytes(&buffer[offset..]) {
            Ok((record, consumed)) => {
                ops.push(record.op);
                offset += consumed;
            }
            Err(WalRecordError::InsufficientData) => {
                if let Some(next) = next_valid_record(&buffer[offset + 1..]) {
                    return Err(WalReaderError::LengthOverrun {
                        offset: offset as u64,
                        next_valid: (offset + 1 + next) as u64,
                    });
                }
                stop_reason = ReadStopReason::PartialRecord {
                    offset: offset as u64,
                };
                break;
            }
            Err(source) => {
                return Err(WalReaderError::Corrupt {
                    offset: offset as u64,
                    source,
                });
            }
        }
    }

    Ok(WalReadResult {
        ops,
        valid_end: offset as u64,
        file_len: buffer.len() as u64,
        stop_reason,
    })
}

/// Offset of the first position in `bytes` holding a complete record
fn next_valid_record(bytes: &[u8]) -> Option<usize> {
    (0..bytes.len()).find(|&start| WalRecord::from_bytes(&bytes[start..]).is_ok())
}
