//! Index recovery
//!
//! Rebuilds the key index by replaying the log from offset 0.
//!
//! A record that runs past EOF is only accepted as a torn tail (the
//! remains of an interrupted append) when no complete, checksum-valid
//! record starts anywhere after it. Otherwise its length field is damaged
//! and replay fails instead of cutting committed records off the log.

use tracing::{trace, warn};

use crate::error::{LogKvError, Result};
use crate::log::LogFile;
use crate::record::{self, RecordHeader, RECORD_PREFIX_SIZE};

use super::{KeyIndex, KeyLocation, RecoveryReport};

/// Bytes read at a time while searching a tail for a valid record
const RESYNC_WINDOW: usize = 64 * 1024;

/// A record cut short by the end of the log
#[derive(Debug, Clone, Copy)]
struct TornTail {
    offset: u64,
    needed: usize,
    available: usize,
}

impl KeyIndex {
    /// Replay `log` into a fresh index
    ///
    /// This will:
    /// 1. Read every record in order, verifying its checksum
    /// 2. Point each key at its latest record
    /// 3. Cut a torn record at the end of the log, if any
    ///
    /// A complete record that fails validation aborts replay with
    /// `Corruption`; the store must not open on top of it.
    pub fn rebuild(log: &mut LogFile) -> Result<(Self, RecoveryReport)> {
        let (index, mut report, torn) = Self::replay(log)?;

        if let Some(tail) = torn {
            warn!(
                offset = tail.offset,
                needed = tail.needed,
                available = tail.available,
                dropped = report.torn_bytes,
                "dropping torn record at end of log"
            );
            log.truncate(tail.offset)?;
            report.truncated_bytes = report.torn_bytes;
        }

        Ok((index, report))
    }

    /// Replay `log` without modifying it
    ///
    /// Same checks as [`KeyIndex::rebuild`]; a torn tail is reported in
    /// `torn_bytes` but left in place.
    pub fn verify(log: &LogFile) -> Result<(Self, RecoveryReport)> {
        let (index, report, _) = Self::replay(log)?;
        Ok((index, report))
    }

    fn replay(log: &LogFile) -> Result<(Self, RecoveryReport, Option<TornTail>)> {
        let mut index = KeyIndex::new();
        let mut report = RecoveryReport::default();
        let mut torn = None;

        let mut scanner = log.scan()?;
        while let Some(item) = scanner.next() {
            match item {
                Ok(chunk) => {
                    let corrupt = |e: LogKvError| LogKvError::Corruption {
                        offset: chunk.offset,
                        source: Box::new(e),
                    };

                    let (header, key) = record::decode_key(&chunk.bytes).map_err(corrupt)?;
                    let length = u32::try_from(chunk.len())
                        .map_err(|_| corrupt(LogKvError::RecordTooLarge(chunk.len())))?;

                    trace!(offset = chunk.offset, length, epoch = header.epoch, key = %key, "replayed record");

                    index.put(
                        key,
                        KeyLocation {
                            offset: chunk.offset,
                            length,
                        },
                    );
                    report.records_replayed += 1;
                }
                Err(LogKvError::Truncated { needed, available }) => {
                    torn = Some(TornTail {
                        offset: scanner.position(),
                        needed,
                        available,
                    });
                }
                Err(e) if e.is_corruption() => {
                    return Err(LogKvError::Corruption {
                        offset: scanner.position(),
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        let valid_len = scanner.position();
        drop(scanner);

        if let Some(tail) = torn {
            if let Some(found) = next_valid_record(log, tail.offset)? {
                return Err(LogKvError::Corruption {
                    offset: tail.offset,
                    source: Box::new(LogKvError::Malformed(format!(
                        "record needs {} bytes but only {} remain, and a valid record follows at offset {}",
                        tail.needed, tail.available, found
                    ))),
                });
            }
            report.torn_bytes = log.len() - tail.offset;
        }

        report.valid_len = valid_len;
        report.live_keys = index.len() as u64;
        report.garbage_bytes = index.garbage_bytes();

        Ok((index, report, torn))
    }
}

/// First offset after `from` where a complete, checksum-valid record starts
fn next_valid_record(log: &LogFile, from: u64) -> Result<Option<u64>> {
    let end = log.len();
    let mut window_start = from + 1;

    while window_start + RECORD_PREFIX_SIZE as u64 <= end {
        let len = (end - window_start).min(RESYNC_WINDOW as u64) as usize;
        let window = log.read_at(window_start, len)?;
        // Every candidate has a full prefix inside this window
        let candidates = window.len() - RECORD_PREFIX_SIZE + 1;

        for i in 0..candidates {
            let offset = window_start + i as u64;
            let header = RecordHeader::parse(&window[i..])?;
            if header.validate().is_err() || header.total_len() > end - offset {
                continue;
            }

            let bytes = log.read_at(offset, header.total_len() as usize)?;
            if record::decode(&bytes).is_ok() {
                return Ok(Some(offset));
            }
        }

        window_start += candidates as u64;
    }

    Ok(None)
}
