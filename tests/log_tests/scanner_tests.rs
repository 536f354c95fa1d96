//! Tests for the Log Scanner
//!
//! These tests verify:
//! - Scanning an empty log
//! - One chunk per record, with correct offsets
//! - Termination at a torn tail (partial header, partial payload)
//! - Termination at a header with unknown type tags or impossible widths

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use logkv::config::SyncPolicy;
use logkv::log::LogFile;
use logkv::record::{self, TypedValue, RECORD_PREFIX_SIZE};
use logkv::LogKvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("scan.db");
    (temp_dir, log_path)
}

fn encode_text(key: &str, value: &str) -> Vec<u8> {
    record::encode(1, &TypedValue::from(key), &TypedValue::from(value)).unwrap()
}

fn append_raw(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
}

// =============================================================================
// Clean Log Tests
// =============================================================================

#[test]
fn test_scan_empty_log() {
    let (_temp, log_path) = setup_temp_log();
    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    let mut scanner = log.scan().unwrap();
    assert!(scanner.next().is_none());
    assert_eq!(scanner.position(), 0);
}

#[test]
fn test_scan_yields_each_record() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    let records = vec![
        encode_text("a", "1"),
        encode_text("bb", "22"),
        record::encode(2, &TypedValue::Int(3), &TypedValue::Float(3.5)).unwrap(),
    ];
    let mut offsets = Vec::new();
    for bytes in &records {
        offsets.push(log.append(bytes).unwrap());
    }

    let chunks: Vec<_> = log.scan().unwrap().map(|c| c.unwrap()).collect();

    assert_eq!(chunks.len(), 3);
    for ((chunk, offset), bytes) in chunks.iter().zip(&offsets).zip(&records) {
        assert_eq!(chunk.offset, *offset);
        assert_eq!(&chunk.bytes, bytes);
    }
}

#[test]
fn test_scan_position_reaches_end() {
    let (_temp, log_path) = setup_temp_log();
    let mut log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();

    for i in 0..10 {
        log.append(&encode_text(&format!("key{}", i), "v")).unwrap();
    }

    let mut scanner = log.scan().unwrap();
    let mut count = 0;
    while let Some(chunk) = scanner.next() {
        chunk.unwrap();
        count += 1;
    }

    assert_eq!(count, 10);
    assert_eq!(scanner.position(), log.write_pos());
}

// =============================================================================
// Torn Tail Tests
// =============================================================================

#[test]
fn test_scan_stops_at_partial_header() {
    let (_temp, log_path) = setup_temp_log();
    let good = encode_text("k", "v");
    append_raw(&log_path, &good);
    append_raw(&log_path, &[0u8; 7]);

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
    let mut scanner = log.scan().unwrap();

    assert!(scanner.next().unwrap().is_ok());
    match scanner.next() {
        Some(Err(LogKvError::Truncated { needed, available })) => {
            assert_eq!(needed, RECORD_PREFIX_SIZE);
            assert_eq!(available, 7);
        }
        other => panic!("expected truncation, got {:?}", other),
    }
    assert!(scanner.next().is_none());
    assert_eq!(scanner.position(), good.len() as u64);
}

#[test]
fn test_scan_stops_at_partial_payload() {
    let (_temp, log_path) = setup_temp_log();
    let good = encode_text("k", "v");
    let torn = encode_text("key2", "a much longer value");
    append_raw(&log_path, &good);
    append_raw(&log_path, &torn[..RECORD_PREFIX_SIZE + 2]);

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
    let mut scanner = log.scan().unwrap();

    assert!(scanner.next().unwrap().is_ok());
    match scanner.next() {
        Some(Err(LogKvError::Truncated { needed, available })) => {
            assert_eq!(needed, torn.len());
            assert_eq!(available, RECORD_PREFIX_SIZE + 2);
        }
        other => panic!("expected truncation, got {:?}", other),
    }
    assert!(scanner.next().is_none());
    assert_eq!(scanner.position(), good.len() as u64);
}

// =============================================================================
// Structural Corruption Tests
// =============================================================================

#[test]
fn test_scan_stops_at_unknown_type_tag() {
    let (_temp, log_path) = setup_temp_log();
    let good = encode_text("k", "v");
    let mut bad = encode_text("k2", "v2");
    bad[16] = 0x7F;
    append_raw(&log_path, &good);
    append_raw(&log_path, &bad);
    append_raw(&log_path, &good);

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
    let mut scanner = log.scan().unwrap();

    assert!(scanner.next().unwrap().is_ok());
    assert!(matches!(
        scanner.next(),
        Some(Err(LogKvError::UnsupportedType(0x7F)))
    ));
    assert!(scanner.next().is_none());
    assert_eq!(scanner.position(), good.len() as u64);
}

#[test]
fn test_scan_does_not_check_crc() {
    // Checksums belong to the codec; the scanner only frames records
    let (_temp, log_path) = setup_temp_log();
    let mut bytes = encode_text("k", "v");
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    append_raw(&log_path, &bytes);

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
    let chunks: Vec<_> = log.scan().unwrap().collect();

    assert_eq!(chunks.len(), 1);
    let chunk = chunks.into_iter().next().unwrap().unwrap();
    assert!(matches!(
        record::decode(&chunk.bytes),
        Err(LogKvError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_scan_rejects_bad_fixed_width_before_length() {
    let (_temp, log_path) = setup_temp_log();
    let good = encode_text("k", "v");
    let mut bad = record::encode(1, &TypedValue::Int(7), &TypedValue::from("x")).unwrap();
    // Int key claiming a length far past EOF: damaged header, not a torn tail
    bad[11] = 0x40;
    append_raw(&log_path, &good);
    append_raw(&log_path, &bad);

    let log = LogFile::open(&log_path, SyncPolicy::Flush).unwrap();
    let mut scanner = log.scan().unwrap();

    assert!(scanner.next().unwrap().is_ok());
    assert!(matches!(scanner.next(), Some(Err(LogKvError::Malformed(_)))));
    assert!(scanner.next().is_none());
    assert_eq!(scanner.position(), good.len() as u64);
}
