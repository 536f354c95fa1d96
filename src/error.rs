//! Error types for LogKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LogKvError
pub type Result<T> = std::result::Result<T, LogKvError>;

/// Unified error type for LogKV operations
#[derive(Debug, Error)]
pub enum LogKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer bytes on disk than an index entry promised
    #[error("Short read at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported value type tag: {0}")]
    UnsupportedType(u16),

    #[error("Checksum mismatch: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// A buffer ends before the lengths it declares
    #[error("Truncated record: need {needed} bytes, only {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Record payload too large: {0} bytes")]
    RecordTooLarge(usize),

    // -------------------------------------------------------------------------
    // Recovery Errors
    // -------------------------------------------------------------------------
    /// A complete record in the log failed validation during replay
    #[error("Log corruption at offset {offset}: {source}")]
    Corruption {
        offset: u64,
        source: Box<LogKvError>,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LogKvError {
    /// True for failures that mean "these bytes are not a valid record",
    /// as opposed to the storage itself failing.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            LogKvError::ChecksumMismatch { .. }
                | LogKvError::UnsupportedType(_)
                | LogKvError::Malformed(_)
                | LogKvError::Corruption { .. }
        )
    }
}
