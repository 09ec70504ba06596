//! Durability mode for WAL operations.
//!
//! Defines the durability guarantees for WAL writes.

/// Durability mode for WAL writes.
///
/// Every record is written and flushed to the OS before the update it
/// describes becomes visible. The mode only decides how often the file is
/// fsynced.
///
/// # Mode Comparison
///
/// | Mode | fsync | Data Loss Window (power failure) |
/// |------|-------|----------------------------------|
/// | Always | Every record | Zero |
/// | Standard | Every `sync_every` records | Up to `sync_every - 1` records |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityMode {
    /// fsync after every record (slow, maximum durability).
    Always,

    /// fsync every N records.
    ///
    /// A process crash loses nothing; an OS crash may lose the records
    /// written since the last fsync.
    Standard {
        /// Maximum records between fsyncs
        sync_every: usize,
    },
}

impl DurabilityMode {
    /// Default number of records between fsyncs in Standard mode
    pub const DEFAULT_SYNC_EVERY: usize = 64;

    /// Create a standard mode with the recommended batch size
    pub fn standard_default() -> Self {
        DurabilityMode::Standard {
            sync_every: Self::DEFAULT_SYNC_EVERY,
        }
    }

    /// Check if this mode requires immediate fsync on every record.
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, DurabilityMode::Always)
    }

    /// Records allowed between fsyncs (1 for Always)
    pub fn sync_every(&self) -> usize {
        match self {
            DurabilityMode::Always => 1,
            DurabilityMode::Standard { sync_every } => (*sync_every).max(1),
        }
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            DurabilityMode::Always => "Always sync (safest, slowest)",
            DurabilityMode::Standard { .. } => "Standard (balanced speed/safety)",
        }
    }
}

impl Default for DurabilityMode {
    fn default() -> Self {
        Self::standard_default()
    }
}
