//! Key Index Module
//!
//! In-memory map from key to the log location of its latest record.
//!
//! ## Responsibilities
//! - O(1) key → (offset, length) lookup
//! - Last-writer-wins on overwrite
//! - Rebuild from the log on open (replay)
//! - Track bytes held by overwritten records
//!
//! The index is never persisted; it is always derived from the log.

mod key_index;
mod recovery;

use serde::{Deserialize, Serialize};

pub use key_index::KeyIndex;

/// Where a record lives in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyLocation {
    /// Offset of the record's first byte
    pub offset: u64,
    /// Total record length (prefix + key + value)
    pub length: u32,
}

/// Result of replaying the log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryReport {
    /// Complete, checksum-valid records read
    pub records_replayed: u64,

    /// Distinct keys after replay
    pub live_keys: u64,

    /// Bytes held by records that a later write for the same key shadows
    pub garbage_bytes: u64,

    /// Length of the log that holds valid records
    pub valid_len: u64,

    /// Bytes of a torn record found at the end of the log
    pub torn_bytes: u64,

    /// Bytes cut from the end of the log (zero for a read-only verify)
    pub truncated_bytes: u64,
}

impl RecoveryReport {
    /// Whether a torn tail was removed during replay
    pub fn was_truncated(&self) -> bool {
        self.truncated_bytes > 0
    }

    /// Whether replay ended at a torn record
    pub fn has_torn_tail(&self) -> bool {
        self.torn_bytes > 0
    }
}
