//! Tests for SegmentScanner
//!
//! These tests verify:
//! - Keys and locations for every frame, in file order
//! - Clean termination at a frame boundary
//! - Truncated trailing frames are hard errors
//! - The scan cannot be resumed after it ends

use std::fs::{File, OpenOptions};
use std::io::{Cursor, Write};
use std::path::PathBuf;

use caskkv::record::{encode, SegmentScanner, HEADER_SIZE};
use caskkv::CaskError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn build_segment(records: &[(&[u8], &[u8], i64)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for (key, value, ts) in records {
        bytes.extend_from_slice(&encode(key, value, *ts).unwrap());
    }
    bytes
}

fn scanner_over(bytes: Vec<u8>) -> SegmentScanner<Cursor<Vec<u8>>> {
    let len = bytes.len() as u64;
    SegmentScanner::new(Cursor::new(bytes), len)
}

fn setup_segment_file(bytes: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("segment.data");
    let mut file = File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    file.sync_all().unwrap();
    (temp_dir, path)
}

// =============================================================================
// Clean Segment Tests
// =============================================================================

#[test]
fn test_scan_empty_segment() {
    let mut scanner = scanner_over(Vec::new());
    assert!(scanner.next().is_none());
}

#[test]
fn test_scan_yields_locations_in_order() {
    let bytes = build_segment(&[(b"a", b"1", 10), (b"bb", b"22", 20), (b"a", b"333", 30)]);
    let items: Vec<_> = scanner_over(bytes).map(|r| r.unwrap()).collect();

    assert_eq!(items.len(), 3);

    let (key, loc) = &items[0];
    assert_eq!(key, b"a");
    assert_eq!(loc.value_offset, HEADER_SIZE + 1);
    assert_eq!(loc.value_len, 1);
    assert_eq!(loc.timestamp, 10);

    let second_start = HEADER_SIZE + 1 + 1;
    let (key, loc) = &items[1];
    assert_eq!(key, b"bb");
    assert_eq!(loc.value_offset, second_start + HEADER_SIZE + 2);
    assert_eq!(loc.value_len, 2);

    let third_start = second_start + HEADER_SIZE + 2 + 2;
    let (key, loc) = &items[2];
    assert_eq!(key, b"a");
    assert_eq!(loc.value_offset, third_start + HEADER_SIZE + 1);
    assert_eq!(loc.value_len, 3);
    assert_eq!(loc.timestamp, 30);
}

#[test]
fn test_scan_locations_point_at_values() {
    let bytes = build_segment(&[(b"k1", b"first value", 1), (b"k2", b"", 2), (b"k3", b"third", 3)]);
    let items: Vec<_> = scanner_over(bytes.clone()).map(|r| r.unwrap()).collect();

    let values: Vec<&[u8]> = items
        .iter()
        .map(|(_, loc)| {
            let start = loc.value_offset as usize;
            &bytes[start..start + loc.value_len as usize]
        })
        .collect();

    assert_eq!(values, vec![&b"first value"[..], &b""[..], &b"third"[..]]);
}

#[test]
fn test_scan_position_tracks_frames() {
    let bytes = build_segment(&[(b"a", b"1", 0), (b"b", b"2", 0)]);
    let total = bytes.len() as u64;
    let mut scanner = scanner_over(bytes);

    assert_eq!(scanner.position(), 0);
    scanner.next().unwrap().unwrap();
    assert_eq!(scanner.position(), HEADER_SIZE + 2);
    scanner.next().unwrap().unwrap();
    assert_eq!(scanner.position(), total);
    assert!(scanner.next().is_none());
}

#[test]
fn test_scan_large_value_is_skipped() {
    let big = vec![0xABu8; 3 * 1024 * 1024];
    let bytes = build_segment(&[(b"big", &big, 0), (b"small", b"s", 0)]);
    let items: Vec<_> = scanner_over(bytes).map(|r| r.unwrap()).collect();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].1.value_len, big.len() as u64);
    assert_eq!(items[1].0, b"small");
}

#[test]
fn test_scan_file_with_small_buffer() {
    let bytes = build_segment(&[(b"one", b"1111", 1), (b"two", b"22222222", 2)]);
    let (_temp, path) = setup_segment_file(&bytes);

    let file = File::open(&path).unwrap();
    let len = file.metadata().unwrap().len();
    let keys: Vec<Vec<u8>> = SegmentScanner::with_capacity(7, file, len)
        .map(|r| r.unwrap().0)
        .collect();

    assert_eq!(keys, vec![b"one".to_vec(), b"two".to_vec()]);
}

// =============================================================================
// Truncation Tests
// =============================================================================

#[test]
fn test_scan_truncated_header_is_error() {
    let mut bytes = build_segment(&[(b"a", b"1", 0)]);
    let good_len = bytes.len() as u64;
    bytes.extend_from_slice(&[1, 2, 3, 4, 5]);

    let mut scanner = scanner_over(bytes);
    assert!(scanner.next().unwrap().is_ok());

    let err = scanner.next().unwrap().unwrap_err();
    assert!(matches!(err, CaskError::TruncatedRecord { offset } if offset == good_len));
}

#[test]
fn test_scan_truncated_value_is_error() {
    let mut bytes = build_segment(&[(b"a", b"1", 0), (b"b", b"0123456789", 0)]);
    bytes.truncate(bytes.len() - 4);

    let results: Vec<_> = scanner_over(bytes).collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(CaskError::TruncatedRecord { offset }) if offset == HEADER_SIZE + 2
    ));
}

#[test]
fn test_scan_truncated_file_on_disk() {
    let bytes = build_segment(&[(b"kept", b"value", 0), (b"torn", b"value", 0)]);
    let (_temp, path) = setup_segment_file(&bytes);

    let file = OpenOptions::new().write(true).open(&path).unwrap();
    file.set_len(bytes.len() as u64 - 1).unwrap();
    drop(file);

    let file = File::open(&path).unwrap();
    let len = file.metadata().unwrap().len();
    let results: Vec<_> = SegmentScanner::new(file, len).collect();

    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(CaskError::TruncatedRecord { .. })));
}

#[test]
fn test_scan_stops_after_error() {
    let mut bytes = build_segment(&[(b"a", b"1", 0)]);
    bytes.extend_from_slice(&[0u8; 3]);

    let mut scanner = scanner_over(bytes);
    scanner.next().unwrap().unwrap();
    assert!(scanner.next().unwrap().is_err());
    assert!(scanner.next().is_none());
    assert!(scanner.next().is_none());
}
