//! Log Scanner
//!
//! Sequential iteration over the raw records of a log file.

use std::fs::File;
use std::io::{BufReader, Read};

use crate::error::{LogKvError, Result};
use crate::record::{RecordHeader, RECORD_PREFIX_SIZE};

/// One record's raw bytes and where they start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChunk {
    pub offset: u64,
    /// Checksum, header and payload exactly as stored
    pub bytes: Vec<u8>,
}

impl LogChunk {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Forward iterator over the records in a log
///
/// Yields `Ok(chunk)` per record. Ends at a clean EOF. A record that runs
/// past EOF yields one `Err(Truncated)`; a header with unknown type tags
/// yields one `Err(UnsupportedType)`, and an Int/Float payload whose declared
/// length is not 8 yields one `Err(Malformed)`. Nothing follows an error.
pub struct LogScanner {
    reader: BufReader<File>,
    /// Offset of the next unread record
    position: u64,
    /// Stop reading here (log length when the scan began)
    end_offset: u64,
    finished: bool,
}

impl LogScanner {
    pub(super) fn new(file: File, end_offset: u64) -> Self {
        Self {
            reader: BufReader::new(file),
            position: 0,
            end_offset,
            finished: false,
        }
    }

    /// Offset of the next record; after an error, the start of the bad record
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Stop and hand back the error
    fn fail(&mut self, err: LogKvError) -> Option<Result<LogChunk>> {
        self.finished = true;
        Some(Err(err))
    }
}

impl Iterator for LogScanner {
    type Item = Result<LogChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.position >= self.end_offset {
            return None;
        }

        let remaining = self.end_offset - self.position;
        if remaining < RECORD_PREFIX_SIZE as u64 {
            return self.fail(LogKvError::Truncated {
                needed: RECORD_PREFIX_SIZE,
                available: remaining as usize,
            });
        }

        // Read checksum + header
        let mut prefix = [0u8; RECORD_PREFIX_SIZE];
        if let Err(e) = self.reader.read_exact(&mut prefix) {
            return self.fail(LogKvError::Io(e));
        }

        let header = match RecordHeader::parse(&prefix) {
            Ok(h) => h,
            Err(e) => return self.fail(e),
        };

        // Unknown tags or impossible widths mean the header is damaged;
        // checked before the length so it is never mistaken for a torn tail
        if let Err(e) = header.validate() {
            return self.fail(e);
        }

        let total_len = header.total_len();
        if total_len > remaining {
            return self.fail(LogKvError::Truncated {
                needed: total_len as usize,
                available: remaining as usize,
            });
        }

        // Read key + value payload
        let mut bytes = Vec::with_capacity(total_len as usize);
        bytes.extend_from_slice(&prefix);
        bytes.resize(total_len as usize, 0);
        if let Err(e) = self.reader.read_exact(&mut bytes[RECORD_PREFIX_SIZE..]) {
            return self.fail(LogKvError::Io(e));
        }

        let chunk = LogChunk {
            offset: self.position,
            bytes,
        };
        self.position += total_len;

        Some(Ok(chunk))
    }
}
