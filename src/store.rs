//! Store Module
//!
//! The facade that ties the record codec, log file and key index together.
//!
//! ## Responsibilities
//! - Replay the log into the index on open
//! - Append-then-index on put
//! - Index-then-read on get
//! - Own the log handle and the index for the store's lifetime
//!
//! ## Lifecycle
//! ```text
//! Closed ──open()──▶ Loading ──(index rebuilt)──▶ Ready ──close()──▶ Closed
//! ```
//! `Store::open` is the only constructor and returns once replay finishes;
//! `close` consumes the store. Operations outside `Ready` do not compile.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::config::{Config, ReadChecksumPolicy};
use crate::error::{LogKvError, Result};
use crate::index::{KeyIndex, KeyLocation, RecoveryReport};
use crate::log::LogFile;
use crate::record::{self, Record, TypedValue};

/// Point-in-time numbers about a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Distinct keys in the index
    pub live_keys: u64,
    /// Total bytes in the log
    pub log_bytes: u64,
    /// Bytes of records the index still points at
    pub live_bytes: u64,
    /// Bytes of overwritten records
    pub garbage_bytes: u64,
}

/// A single-log key-value store
///
/// ## Concurrency Model: single-threaded
///
/// - Writes (`put`, `sync`) take `&mut self`
/// - Reads (`get`, `keys`, `size`) take `&self`
/// - No locks; the store is not meant to be shared across threads or
///   processes, and two stores on one file is out of contract
pub struct Store {
    /// Store configuration
    config: Config,

    /// The append-only log (exclusively owned)
    log: LogFile,

    /// Key → location of latest record (exclusively owned)
    index: KeyIndex,

    /// What replay found when the store was opened
    recovery: RecoveryReport,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Open/create the log file
    /// 2. Replay it into a fresh index (fails on corruption)
    /// 3. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let mut log = LogFile::open(&config.path, config.sync_policy)?;
        let (index, recovery) = KeyIndex::rebuild(&mut log)?;

        info!(
            path = %config.path.display(),
            records = recovery.records_replayed,
            keys = recovery.live_keys,
            garbage_bytes = recovery.garbage_bytes,
            truncated_bytes = recovery.truncated_bytes,
            "store opened"
        );

        Ok(Self {
            config,
            log,
            index,
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified log file
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().path(path).build();
        Self::open(config)
    }

    /// Replay the log at `path` and report what recovery would find
    ///
    /// Read-only: the file is not created, and a torn tail is reported in
    /// `torn_bytes` but not cut. Corruption fails the same way `open` does.
    pub fn verify(path: &Path) -> Result<RecoveryReport> {
        let log = LogFile::open_read_only(path)?;
        let (_, report) = KeyIndex::verify(&log)?;

        info!(
            path = %path.display(),
            records = report.records_replayed,
            keys = report.live_keys,
            torn_bytes = report.torn_bytes,
            "log verified"
        );

        Ok(report)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Stamp with the current time (seconds)
    /// 2. Encode the record
    /// 3. Append to the log (flushed before returning)
    /// 4. Point the index at the new record
    pub fn put(&mut self, key: impl Into<TypedValue>, value: impl Into<TypedValue>) -> Result<()> {
        let key = key.into();
        let value = value.into();

        let bytes = record::encode(current_epoch(), &key, &value)?;
        let offset = self.log.append(&bytes)?;

        debug!(key = %key, offset, length = bytes.len(), "put");

        self.index.put(
            key,
            KeyLocation {
                offset,
                // encode caps records at u32::MAX bytes
                length: bytes.len() as u32,
            },
        );

        Ok(())
    }

    /// Get the value for a key
    ///
    /// Returns `Ok(None)` when the key was never written. A record that
    /// fails its checksum is handled per `ReadChecksumPolicy`.
    pub fn get(&self, key: &TypedValue) -> Result<Option<TypedValue>> {
        Ok(self.get_record(key)?.map(|record| record.value))
    }

    /// Get the full record (epoch, key, value) for a key
    pub fn get_record(&self, key: &TypedValue) -> Result<Option<Record>> {
        let location = match self.index.get(key) {
            Some(loc) => loc,
            None => return Ok(None),
        };

        let bytes = self.log.read_at(location.offset, location.length as usize)?;

        match record::decode(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(LogKvError::ChecksumMismatch { expected, actual })
                if self.config.read_checksum_policy == ReadChecksumPolicy::Lenient =>
            {
                warn!(
                    key = %key,
                    offset = location.offset,
                    expected,
                    actual,
                    "checksum mismatch on read, treating key as absent"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the index holds `key`
    pub fn contains_key(&self, key: &TypedValue) -> bool {
        self.index.contains(key)
    }

    /// Snapshot of all keys (no ordering guarantee)
    pub fn keys(&self) -> Vec<TypedValue> {
        self.index.keys()
    }

    /// Number of live keys
    pub fn size(&self) -> u64 {
        self.index.len() as u64
    }

    /// Force every appended record to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.log.sync()
    }

    /// Close the store, releasing the log handle
    ///
    /// Every put is already flushed, so nothing else is written here.
    pub fn close(self) -> Result<()> {
        debug!(path = %self.config.path.display(), keys = self.index.len(), "store closed");
        drop(self.log);
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            live_keys: self.index.len() as u64,
            log_bytes: self.log.len(),
            live_bytes: self.index.live_bytes(),
            garbage_bytes: self.index.garbage_bytes(),
        }
    }

    /// What replay found when this store was opened
    pub fn recovery_report(&self) -> &RecoveryReport {
        &self.recovery
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Wall-clock seconds since the Unix epoch, clamped to `u32`
fn current_epoch() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
