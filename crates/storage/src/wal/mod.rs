//! Write-Ahead Log (WAL) module.
//!
//! Each durable collection owns one append-only log, `streams.wal`:
//!
//! - **Self-delimiting records**: Each record has a length prefix and CRC32 checksum
//! - **Durability modes**: Always, Standard
//! - **Crash recovery**: A torn tail record is discarded, earlier damage is corruption
//!
//! # Key Invariants
//!
//! - The WAL is append-only; records are never modified in place
//! - A record is written before the update it describes becomes visible
//! - Log order equals apply order for any single document
//!
//! # Usage
//!
//! ```ignore
//! use streamstate_storage::wal::{read_all, DurabilityMode, WalOp, WalRecord, WalWriter};
//!
//! let mut writer = WalWriter::open(&path, DurabilityMode::Always)?;
//! writer.append(&WalRecord::new(WalOp::Insert(stream)))?;
//!
//! let result = read_all(&path)?;
//! ```

mod durability;
pub mod reader;
pub mod record;
pub mod writer;

pub use durability::DurabilityMode;
pub use reader::{read_all, ReadStopReason, WalReadResult, WalReaderError};
pub use record::{WalOp, WalRecord, WalRecordError};
pub use writer::{WalCounters, WalWriter};
