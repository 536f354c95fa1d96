//! Tests for the Log File
//!
//! These tests verify:
//! - Open/create semantics (no truncation of existing content)
//! - Append offsets and write position
//! - Positioned reads and short reads
//! - Sync policies
//! - Truncation
//! - Failed appends and read-only handles

use std::fs;
use std::path::{Path, PathBuf};

use logkv::config::SyncPolicy;
use logkv::log::LogFile;
use logkv::LogKvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("test.db");
    (temp_dir, log_path)
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, log_path) = setup_temp_log();

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    assert!(log_path.exists());
    assert!(log.is_empty());
    assert_eq!(log.write_pos(), 0);
    assert_eq!(log.path(), log_path.as_path());
}

#[test]
fn test_open_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("nested").join("dir").join("data.db");

    let _log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    assert!(log_path.exists());
}

#[test]
fn test_open_preserves_existing_content() {
    let (_temp, log_path) = setup_temp_log();
    fs::write(&log_path, b"existing bytes").unwrap();

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    assert_eq!(log.write_pos(), 14);
    assert_eq!(fs::read(&log_path).unwrap(), b"existing bytes");
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_returns_start_offset() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    let first = log.append(b"hello").unwrap();
    let second = log.append(b"world!").unwrap();
    let third = log.append(b"").unwrap();

    assert_eq!(first, 0);
    assert_eq!(second, 5);
    assert_eq!(third, 11);
    assert_eq!(log.write_pos(), 11);
}

#[test]
fn test_append_is_visible_immediately() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    log.append(b"abc").unwrap();

    // Another handle sees the bytes without any explicit sync
    assert_eq!(fs::read(&log_path).unwrap(), b"abc");
}

#[test]
fn test_append_after_reopen_continues_at_end() {
    let (_temp, log_path) = setup_temp_log();

    {
        let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
        log.append(b"first").unwrap();
    }

    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
    let offset = log.append(b"second").unwrap();

    assert_eq!(offset, 5);
    assert_eq!(fs::read(&log_path).unwrap(), b"firstsecond");
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_at_exact_range() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    log.append(b"0123456789").unwrap();

    assert_eq!(log.read_at(0, 3).unwrap(), b"012");
    assert_eq!(log.read_at(4, 4).unwrap(), b"4567");
    assert_eq!(log.read_at(9, 1).unwrap(), b"9");
    assert_eq!(log.read_at(10, 0).unwrap(), b"");
}

#[test]
fn test_read_interleaved_with_appends() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    let a = log.append(b"aaaa").unwrap();
    assert_eq!(log.read_at(a, 4).unwrap(), b"aaaa");

    // A read moves the cursor; the next append must still land at the end
    let b = log.append(b"bb").unwrap();
    assert_eq!(b, 4);
    assert_eq!(log.read_at(b, 2).unwrap(), b"bb");
    assert_eq!(log.read_at(0, 6).unwrap(), b"aaaabb");
}

#[test]
fn test_short_read() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    log.append(b"12345").unwrap();

    match log.read_at(3, 10) {
        Err(LogKvError::ShortRead {
            offset,
            expected,
            actual,
        }) => {
            assert_eq!(offset, 3);
            assert_eq!(expected, 10);
            assert_eq!(actual, 2);
        }
        other => panic!("expected short read, got {:?}", other),
    }
}

#[test]
fn test_read_past_end() {
    let (_temp, log_path) = setup_temp_log();
    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    let result = log.read_at(100, 4);
    assert!(matches!(result, Err(LogKvError::ShortRead { actual: 0, .. })));
}

// =============================================================================
// Sync Policy Tests
// =============================================================================

#[test]
fn test_sync_every_write() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::EveryWrite).unwrap();

    log.append(b"k1").unwrap();
    assert_eq!(log.unsynced_writes(), 0);

    log.append(b"k2").unwrap();
    assert_eq!(log.unsynced_writes(), 0);
}

#[test]
fn test_sync_every_n_writes() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::EveryNWrites { count: 3 }).unwrap();

    log.append(b"1").unwrap();
    log.append(b"2").unwrap();
    assert_eq!(log.unsynced_writes(), 2);

    log.append(b"3").unwrap();
    assert_eq!(log.unsynced_writes(), 0);

    log.append(b"4").unwrap();
    assert_eq!(log.unsynced_writes(), 1);
}

#[test]
fn test_flush_policy_never_syncs_implicitly() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    for _ in 0..5 {
        log.append(b"x").unwrap();
    }
    assert_eq!(log.unsynced_writes(), 5);

    log.sync().unwrap();
    assert_eq!(log.unsynced_writes(), 0);
}

// =============================================================================
// Truncate Tests
// =============================================================================

#[test]
fn test_truncate_drops_tail() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    log.append(b"keep").unwrap();
    log.append(b"drop").unwrap();
    log.truncate(4).unwrap();

    assert_eq!(log.write_pos(), 4);
    assert_eq!(fs::read(&log_path).unwrap(), b"keep");

    // Next append starts at the cut
    assert_eq!(log.append(b"!").unwrap(), 4);
    assert_eq!(fs::read(&log_path).unwrap(), b"keep!");
}

#[test]
fn test_truncate_cannot_grow() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    log.append(b"abc").unwrap();

    assert!(log.truncate(10).is_err());
    assert_eq!(log.write_pos(), 3);
}

// =============================================================================
// Failed Append Tests
// =============================================================================

// fsync on /dev/null fails with EINVAL on Linux while writes succeed
#[cfg(target_os = "linux")]
#[test]
fn test_failed_sync_leaves_write_pos_unchanged() {
    let mut log = LogFile::open(Path::new("/dev/null"), SyncPolicy::EveryNWrites { count: 2 }).unwrap();

    assert_eq!(log.append(b"first").unwrap(), 0);
    assert_eq!(log.write_pos(), 5);

    // Second append triggers an fsync, which fails
    assert!(log.append(b"second").is_err());
    assert_eq!(log.write_pos(), 5);
    assert_eq!(log.unsynced_writes(), 1);
}

#[test]
fn test_read_only_log_rejects_append() {
    let (_temp, log_path) = setup_temp_log();
    {
        let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
        log.append(b"data").unwrap();
    }

    let mut log = LogFile::open_read_only(&log_path).unwrap();

    assert_eq!(log.write_pos(), 4);
    assert_eq!(log.read_at(0, 4).unwrap(), b"data");
    assert!(log.append(b"more").is_err());
    assert!(log.truncate(0).is_err());
    assert_eq!(log.write_pos(), 4);
    assert_eq!(fs::read(&log_path).unwrap(), b"data");
}

#[test]
fn test_read_only_open_does_not_create() {
    let (_temp, log_path) = setup_temp_log();

    let result = LogFile::open_read_only(&log_path);

    assert!(matches!(result, Err(LogKvError::Io(_))));
    assert!(!log_path.exists());
}
