//! Configuration for LogKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{LogKvError, Result};

/// Main configuration for a LogKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the single append-only log file.
    /// Created on open if missing; parent directories are created too.
    pub path: PathBuf,

    /// How hard each append pushes bytes toward the disk
    pub sync_policy: SyncPolicy,

    // -------------------------------------------------------------------------
    // Read Path Configuration
    // -------------------------------------------------------------------------
    /// What `get` does when a record fails its checksum
    pub read_checksum_policy: ReadChecksumPolicy,
}

/// Durability applied after every append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Write and flush to the OS only (data survives a process crash,
    /// not necessarily a power failure)
    Flush,

    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after every N appends
    EveryNWrites { count: usize },
}

/// Handling of a checksum failure on the read path.
///
/// Replay at open is always strict; this only governs `Store::get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadChecksumPolicy {
    /// Treat the key as absent and log a warning
    Lenient,

    /// Surface `ChecksumMismatch` to the caller
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./logkv.db"),
            sync_policy: SyncPolicy::Flush,
            read_checksum_policy: ReadChecksumPolicy::Lenient,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(LogKvError::Config("log path is empty".to_string()));
        }
        if let SyncPolicy::EveryNWrites { count: 0 } = self.sync_policy {
            return Err(LogKvError::Config(
                "EveryNWrites requires count > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the sync policy
    pub fn sync_policy(mut self, policy: SyncPolicy) -> Self {
        self.config.sync_policy = policy;
        self
    }

    /// Set the read-path checksum policy
    pub fn read_checksum_policy(mut self, policy: ReadChecksumPolicy) -> Self {
        self.config.read_checksum_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
