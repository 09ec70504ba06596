//! WAL record format.
//!
//! Each record is self-delimiting:
//!
//! ```text
//! ┌──────────┬────────────────┬──────────────────────┬──────────┐
//! │ len: u32 │ version: u8    │ payload (msgpack)    │ crc: u32 │
//! └──────────┴────────────────┴──────────────────────┴──────────┘
//! ```
//!
//! `len` covers everything after itself (version + payload + crc). All
//! integers are little-endian. The CRC32 covers version + payload.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use streamstate_core::{Stream, StreamId, StreamState};

/// Current record format version
pub const WAL_RECORD_FORMAT_VERSION: u8 = 1;

/// Upper bound on a single record, anything larger is treated as garbage
pub const MAX_RECORD_LEN: usize = 1024 * 1024;

/// Mutation captured by one WAL record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalOp {
    /// A new document
    Insert(Stream),
    /// A state change on an existing document
    SetState {
        /// Document identifier
        id: StreamId,
        /// State written
        state: StreamState,
    },
}

/// A single framed WAL record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    /// The mutation
    pub op: WalOp,
}

impl WalRecord {
    /// Create a new WAL record.
    pub fn new(op: WalOp) -> Self {
        WalRecord { op }
    }

    /// Serialize record to bytes (for writing to WAL).
    pub fn to_bytes(&self) -> Result<Vec<u8>, WalRecordError> {
        let body =
            rmp_serde::to_vec(&self.op).map_err(|e| WalRecordError::Encode(e.to_string()))?;

        let mut payload = Vec::with_capacity(1 + body.len());
        payload.push(WAL_RECORD_FORMAT_VERSION);
        payload.extend_from_slice(&body);

        let crc = crc32fast::hash(&payload);
        let total_len = payload.len() + 4;

        let mut record = Vec::with_capacity(4 + total_len);
        record
            .write_u32::<LittleEndian>(total_len as u32)
            .map_err(|e| WalRecordError::Encode(e.to_string()))?;
        record.extend_from_slice(&payload);
        record
            .write_u32::<LittleEndian>(crc)
            .map_err(|e| WalRecordError::Encode(e.to_string()))?;
        Ok(record)
    }

    /// Deserialize record from bytes.
    ///
    /// Returns (record, bytes_consumed) on success.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, usize), WalRecordError> {
        if bytes.len() < 4 {
            return Err(WalRecordError::InsufficientData);
        }

        let length = LittleEndian::read_u32(&bytes[0..4]) as usize;

        // Minimum: 1 byte format version + 4 bytes CRC
        if length < 5 || length > MAX_RECORD_LEN {
            return Err(WalRecordError::InvalidFormat);
        }

        if bytes.len() < 4 + length {
            return Err(WalRecordError::InsufficientData);
        }

        let payload = &bytes[4..4 + length - 4];
        let stored_crc = LittleEndian::read_u32(&bytes[4 + length - 4..4 + length]);
        let computed = crc32fast::hash(payload);
        if stored_crc != computed {
            return Err(WalRecordError::ChecksumMismatch {
                expected: stored_crc,
                computed,
            });
        }

        let version = payload[0];
        if version != WAL_RECORD_FORMAT_VERSION {
            return Err(WalRecordError::UnsupportedVersion(version));
        }

        let op: WalOp = rmp_serde::from_slice(&payload[1..])
            .map_err(|e| WalRecordError::Decode(e.to_string()))?;

        Ok((WalRecord { op }, 4 + length))
    }
}

/// WAL record parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalRecordError {
    /// Not enough data to parse record
    #[error("Insufficient data to parse record")]
    InsufficientData,

    /// Record format is invalid
    #[error("Invalid record format")]
    InvalidFormat,

    /// Checksum verification failed
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// Expected checksum from record
        expected: u32,
        /// Computed checksum
        computed: u32,
    },

    /// Unsupported format version
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    /// Payload could not be encoded
    #[error("Encode failed: {0}")]
    Encode(String),

    /// CRC was valid but the payload did not decode
    #[error("Decode failed: {0}")]
    Decode(String),
}
