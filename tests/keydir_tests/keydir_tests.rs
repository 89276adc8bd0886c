//! KeyDir Tests
//!
//! Tests verify:
//! - Lookup of present and absent keys
//! - Unconditional overwrite on upsert
//! - Exact byte comparison of keys
//! - Length and iteration

use caskkv::keydir::{IndexEntry, KeyDir, SegmentId};

fn entry(segment: SegmentId, value_offset: u64, value_len: u64) -> IndexEntry {
    IndexEntry {
        segment,
        value_offset,
        value_len,
        timestamp: 0,
    }
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_keydir_is_empty() {
    let keydir = KeyDir::new();
    assert_eq!(keydir.len(), 0);
    assert!(keydir.is_empty());
    assert!(keydir.lookup(b"anything").is_none());
}

#[test]
fn test_upsert_and_lookup() {
    let mut keydir = KeyDir::new();
    let e = entry(SegmentId::Archived(0), 40, 5);

    assert!(keydir.upsert(b"key".to_vec(), e).is_none());
    assert_eq!(keydir.lookup(b"key"), Some(&e));
    assert!(keydir.contains_key(b"key"));
    assert_eq!(keydir.len(), 1);
}

#[test]
fn test_upsert_overwrites_unconditionally() {
    let mut keydir = KeyDir::new();
    let newer = IndexEntry {
        timestamp: 200,
        ..entry(SegmentId::Archived(1), 10, 1)
    };
    let older = IndexEntry {
        timestamp: 100,
        ..entry(SegmentId::Archived(0), 99, 9)
    };

    keydir.upsert(b"key".to_vec(), newer);
    // An older timestamp still wins because it was inserted last
    let replaced = keydir.upsert(b"key".to_vec(), older);

    assert_eq!(replaced, Some(newer));
    assert_eq!(keydir.lookup(b"key"), Some(&older));
    assert_eq!(keydir.len(), 1);
}

#[test]
fn test_active_and_archived_entries() {
    let mut keydir = KeyDir::new();
    keydir.upsert(b"old".to_vec(), entry(SegmentId::Archived(3), 28, 1));
    keydir.upsert(b"new".to_vec(), entry(SegmentId::Active, 28, 1));

    assert_eq!(keydir.lookup(b"old").unwrap().segment, SegmentId::Archived(3));
    assert_eq!(keydir.lookup(b"new").unwrap().segment, SegmentId::Active);
}

// =============================================================================
// Key Comparison Tests
// =============================================================================

#[test]
fn test_keys_compare_by_exact_bytes() {
    let mut keydir = KeyDir::new();
    keydir.upsert(b"Key".to_vec(), entry(SegmentId::Active, 0, 0));

    assert!(keydir.lookup(b"key").is_none());
    assert!(keydir.lookup(b"Key ").is_none());
    assert!(keydir.lookup(b"Key").is_some());
}

#[test]
fn test_binary_and_empty_keys() {
    let mut keydir = KeyDir::new();
    keydir.upsert(vec![0x00, 0xFF, 0x10], entry(SegmentId::Active, 1, 1));
    keydir.upsert(Vec::new(), entry(SegmentId::Active, 2, 2));

    assert_eq!(keydir.lookup(&[0x00, 0xFF, 0x10]).unwrap().value_offset, 1);
    assert_eq!(keydir.lookup(b"").unwrap().value_offset, 2);
    assert_eq!(keydir.len(), 2);
}

#[test]
fn test_iter_visits_every_key() {
    let mut keydir = KeyDir::new();
    for i in 0..50u64 {
        keydir.upsert(format!("key{}", i).into_bytes(), entry(SegmentId::Active, i, 1));
    }
    // Overwrites do not add keys
    keydir.upsert(b"key7".to_vec(), entry(SegmentId::Active, 999, 1));

    let mut keys: Vec<Vec<u8>> = keydir.iter().map(|(k, _)| k.to_vec()).collect();
    keys.sort();

    assert_eq!(keys.len(), 50);
    assert_eq!(keydir.lookup(b"key7").unwrap().value_offset, 999);
}
