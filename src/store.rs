//! Store Module
//!
//! The façade tying the record codec, key directory and segments together.
//!
//! ## Responsibilities
//! - Rebuild the key directory from segment files on open
//! - Append records and index them only once fully written
//! - Serve reads with one positioned read per value
//! - Serialize every operation behind one lock

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{CaskError, Result};
use crate::keydir::{IndexEntry, KeyDir, SegmentId};
use crate::record::{self, HEADER_SIZE};
use crate::segment::{SegmentManager, SegmentManagerBuilder};

/// Counters collected while rebuilding the index on open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Archived segments scanned
    pub segments_scanned: usize,

    /// Frames decoded across all segments (including shadowed ones)
    pub records_scanned: u64,

    /// Distinct live keys after recovery
    pub keys_indexed: usize,
}

/// Point-in-time view of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub keys: usize,
    pub archived_segments: usize,
    /// Bytes of complete frames in the active segment
    pub active_segment_bytes: u64,
}

/// State guarded by the store's lock
struct StoreInner {
    keydir: KeyDir,
    segments: SegmentManager,
}

/// An embedded log-structured key-value store
///
/// ## Concurrency Model: one lock for everything
///
/// Every `set` and `get` holds `inner` for the whole operation, index
/// access and file I/O included. Reads and writes are fully serialized;
/// a reader sees either the old or the new entry for a key, never a
/// partially written value, because the index is only updated after the
/// complete frame is on disk.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Key directory and segment handles
    inner: Mutex<StoreInner>,

    /// What the startup scan found
    recovery: RecoveryStats,
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if missing
    /// 2. List segment files, oldest first
    /// 3. Open each as archived and index its records in that order
    /// 4. Create a fresh active segment
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Discover existing segments
        let candidates = SegmentManager::list_candidate_files(&config.data_dir)?;

        // Step 3: Rebuild the index oldest → newest so later records win
        let mut keydir = KeyDir::new();
        let mut builder = SegmentManager::builder(&config.data_dir);
        let mut recovery = RecoveryStats::default();

        for path in &candidates {
            let records = Self::recover_segment(&mut builder, &mut keydir, path, &config)
                .map_err(|e| CaskError::Recovery {
                    segment: path.clone(),
                    source: Box::new(e),
                })?;
            recovery.segments_scanned += 1;
            recovery.records_scanned += records;
        }
        recovery.keys_indexed = keydir.len();

        // Step 4: Start this session's active segment
        let segments = builder.create_active(config.sync_strategy)?;

        tracing::info!(
            "Opened store at {}: {} segments, {} records, {} keys",
            config.data_dir.display(),
            recovery.segments_scanned,
            recovery.records_scanned,
            recovery.keys_indexed
        );

        Ok(Self {
            config,
            inner: Mutex::new(StoreInner { keydir, segments }),
            recovery,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Store a value, replacing any previous value for `key`
    ///
    /// Steps:
    /// 1. Acquire the store lock
    /// 2. Encode the frame and append it to the active segment
    /// 3. Index the value only after the full frame is written
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();

        let timestamp = record::unix_timestamp();
        let frame = record::encode(key, value, timestamp)?;

        // On error the active segment is already back at its old length
        let frame_offset = inner.segments.active_mut().append(&frame)?;

        let entry = IndexEntry {
            segment: SegmentId::Active,
            value_offset: frame_offset + HEADER_SIZE + key.len() as u64,
            value_len: value.len() as u64,
            timestamp,
        };
        inner.keydir.upsert(key.to_vec(), entry);

        Ok(())
    }

    /// Get the value stored for `key`
    ///
    /// Returns `Err(CaskError::KeyNotFound)` if the key was never set.
    /// The stored checksum is not verified.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let mut inner = self.inner.lock();
        let StoreInner { keydir, segments } = &mut *inner;

        let entry = *keydir.lookup(key).ok_or(CaskError::KeyNotFound)?;

        let len = usize::try_from(entry.value_len).map_err(|_| {
            CaskError::Corruption(format!("value length {} exceeds memory", entry.value_len))
        })?;
        let mut value = vec![0u8; len];

        let mut handle = segments.resolve(entry.segment)?;
        let read = handle.read_at(entry.value_offset, &mut value)?;
        if read < len {
            return Err(CaskError::IncompleteRead {
                key: key.to_vec(),
                expected: entry.value_len,
                read: read as u64,
            });
        }

        Ok(value)
    }

    /// Check whether `key` has a value, without reading it
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.inner.lock().keydir.contains_key(key)
    }

    /// Force the active segment to durable storage
    pub fn sync(&self) -> Result<()> {
        self.inner.lock().segments.active_mut().sync()
    }

    /// Close the store, syncing the active segment and releasing all files
    pub fn close(self) -> Result<()> {
        let inner = self.inner.into_inner();
        tracing::info!(
            "Closing store at {} ({} keys)",
            self.config.data_dir.display(),
            inner.keydir.len()
        );
        inner.segments.close_all()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner.lock().keydir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().keydir.is_empty()
    }

    /// Snapshot of key and segment counts
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock();
        StoreStats {
            keys: inner.keydir.len(),
            archived_segments: inner.segments.archived_count(),
            active_segment_bytes: inner.segments.active().len(),
        }
    }

    /// What the startup scan found
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery
    }

    /// Path of this session's active segment
    pub fn active_segment_path(&self) -> PathBuf {
        self.inner.lock().segments.active().path().to_path_buf()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Open one archived segment and index every record in it
    ///
    /// Returns the number of records scanned.
    fn recover_segment(
        builder: &mut SegmentManagerBuilder,
        keydir: &mut KeyDir,
        path: &Path,
        config: &Config,
    ) -> Result<u64> {
        let segment = builder.open_archived(path)?;
        let id = segment.id();
        let mut records = 0u64;

        for item in segment.scan(config.scan_buffer_size)? {
            let (key, location) = item?;
            keydir.upsert(
                key,
                IndexEntry {
                    segment: SegmentId::Archived(id),
                    value_offset: location.value_offset,
                    value_len: location.value_len,
                    timestamp: location.timestamp,
                },
            );
            records += 1;
        }

        tracing::debug!(
            "Recovered segment {} as #{}: {} records, {} bytes",
            path.display(),
            id,
            records,
            segment.len()
        );

        Ok(records)
    }
}
