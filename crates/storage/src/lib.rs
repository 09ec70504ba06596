//! Storage layer for streamstate
//!
//! This crate implements the persistence collaborators behind the state
//! store:
//! - MemoryCollection: DashMap-sharded documents with atomic filtered updates
//! - DurableCollection: MemoryCollection + write-ahead log + process lock
//! - wal: Record format, writer with durability modes, recovery reader
//! - testing: ReadRendezvous decorator for deterministic races

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod durable;
pub mod memory;
pub mod testing;
pub mod wal;

pub use durable::{DurableCollection, RecoveryStats, LOCK_FILE_NAME, WAL_FILE_NAME};
pub use memory::MemoryCollection;
pub use testing::ReadRendezvous;
pub use wal::DurabilityMode;
