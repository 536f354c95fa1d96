//! Log File
//!
//! Handles appending to and reading from the single log file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::SyncPolicy;
use crate::error::{LogKvError, Result};

use super::LogScanner;

/// Append-only log file
pub struct LogFile {
    /// Location on disk (the scanner opens its own handle here)
    path: PathBuf,
    /// Read + append handle
    file: File,
    /// Offset where the next append begins; equals the file length
    write_pos: u64,
    sync_policy: SyncPolicy,
    /// Appends since the last fsync
    unsynced_writes: usize,
}

impl LogFile {
    /// Open or create a log file
    ///
    /// Existing content is never truncated here.
    pub fn open(path: &Path, sync_policy: SyncPolicy) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        Self::from_file(path, file, sync_policy)
    }

    /// Open an existing log for reading only
    ///
    /// Fails if the file does not exist. Appends and truncation on the
    /// returned handle fail with an I/O error.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        Self::from_file(path, file, SyncPolicy::Flush)
    }

    fn from_file(path: &Path, file: File, sync_policy: SyncPolicy) -> Result<Self> {
        let write_pos = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            write_pos,
            sync_policy,
            unsynced_writes: 0,
        })
    }

    /// Append bytes to the end of the log
    ///
    /// Returns the offset at which the write began. The bytes are flushed to
    /// the OS before returning; fsync follows the sync policy. If the write
    /// or a required fsync fails, the record is cut back off the file and
    /// `write_pos` is unchanged.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let offset = self.write_pos;

        if let Err(e) = self.file.write_all(bytes).and_then(|_| self.file.flush()) {
            self.cut_back(offset);
            return Err(e.into());
        }

        let must_sync = match self.sync_policy {
            SyncPolicy::Flush => false,
            SyncPolicy::EveryWrite => true,
            SyncPolicy::EveryNWrites { count } => self.unsynced_writes + 1 >= count,
        };
        if must_sync {
            if let Err(e) = self.file.sync_data() {
                self.cut_back(offset);
                return Err(e.into());
            }
            debug!(synced_writes = self.unsynced_writes + 1, "log synced");
            self.unsynced_writes = 0;
        } else {
            self.unsynced_writes += 1;
        }

        self.write_pos += bytes.len() as u64;

        Ok(offset)
    }

    /// Drop a failed append so the file length stays == write_pos
    fn cut_back(&mut self, offset: u64) {
        if let Err(cut) = self.file.set_len(offset) {
            warn!(offset, error = %cut, "failed to cut partial append");
        }
    }

    /// Read exactly `length` bytes starting at `offset`
    pub fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; length];
        let mut filled = 0;
        while filled < length {
            match file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < length {
            return Err(LogKvError::ShortRead {
                offset,
                expected: length,
                actual: filled,
            });
        }

        Ok(buf)
    }

    /// Scan records from offset 0 up to the current write position
    pub fn scan(&self) -> Result<LogScanner> {
        let file = File::open(&self.path)?;
        Ok(LogScanner::new(file, self.write_pos))
    }

    /// Cut the log back to `len` bytes (drops a torn tail)
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        if len > self.write_pos {
            return Err(LogKvError::Config(format!(
                "cannot truncate log of {} bytes to {}",
                self.write_pos, len
            )));
        }

        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.write_pos = len;
        self.unsynced_writes = 0;

        Ok(())
    }

    /// Force all appended bytes to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        debug!(synced_writes = self.unsynced_writes, "log synced");
        self.unsynced_writes = 0;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current write position (== total bytes in the log)
    pub fn write_pos(&self) -> u64 {
        self.write_pos
    }

    pub fn len(&self) -> u64 {
        self.write_pos
    }

    pub fn is_empty(&self) -> bool {
        self.write_pos == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends not yet covered by an fsync
    pub fn unsynced_writes(&self) -> usize {
        self.unsynced_writes
    }
}
