//! Segment Manager
//!
//! Manages the archived segments and the active segment of a store.
//!
//! ## Responsibilities
//! - Discover existing segment files on startup (oldest → newest)
//! - Assign dense, 0-based archived ids in that order
//! - Create the session's active segment with an exclusive create
//! - Resolve index locations to readable segments

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::SyncStrategy;
use crate::error::{CaskError, Result};
use crate::keydir::SegmentId;

use super::{ActiveSegment, ArchivedSegment, SEGMENT_EXTENSION};

/// Collects archived segments during recovery, then creates the active one
///
/// Archived segments can only be added before the active segment exists.
#[derive(Debug)]
pub struct SegmentManagerBuilder {
    data_dir: PathBuf,
    archived: Vec<ArchivedSegment>,
}

impl SegmentManagerBuilder {
    /// Open `path` read-only as the next archived segment
    ///
    /// Its id is the number of segments opened before it.
    pub fn open_archived(&mut self, path: &Path) -> Result<&ArchivedSegment> {
        let id = self.archived.len();
        let segment = ArchivedSegment::open(id, path)?;
        self.archived.push(segment);
        Ok(&self.archived[id])
    }

    /// Number of archived segments opened so far
    pub fn archived_count(&self) -> usize {
        self.archived.len()
    }

    /// Create the active segment and finish building
    ///
    /// The new name always sorts after every archived segment, even if the
    /// clock has stepped backwards. An existing file with the same name is
    /// a fatal `SegmentExists` error.
    pub fn create_active(self, sync_strategy: SyncStrategy) -> Result<SegmentManager> {
        let newest = self
            .archived
            .iter()
            .filter_map(|s| SegmentManager::parse_segment_stamp(s.path()))
            .max();

        let now = unix_nanos();
        let stamp = match newest {
            Some(newest) if newest >= now => newest.saturating_add(1),
            _ => now,
        };

        let path = SegmentManager::segment_path(&self.data_dir, stamp);
        let active = ActiveSegment::create(&path, sync_strategy)?;
        tracing::debug!("Created active segment {}", path.display());

        Ok(SegmentManager {
            data_dir: self.data_dir,
            archived: self.archived,
            active,
        })
    }
}

/// A readable segment returned by [`SegmentManager::resolve`]
#[derive(Debug)]
pub enum SegmentHandle<'a> {
    Archived(&'a ArchivedSegment),
    Active(&'a mut ActiveSegment),
}

impl SegmentHandle<'_> {
    /// Positioned read; returns the number of bytes read
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        match self {
            SegmentHandle::Archived(segment) => segment.read_at(offset, buf),
            SegmentHandle::Active(segment) => segment.read_at(offset, buf),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            SegmentHandle::Archived(segment) => segment.path(),
            SegmentHandle::Active(segment) => segment.path(),
        }
    }
}

/// Owns every open segment of a store
///
/// ## Ownership:
/// - `archived`: read-only handles, index = archived segment id
/// - `active`: the only handle ever written to
/// - Not internally synchronized; the store's lock covers all access
#[derive(Debug)]
pub struct SegmentManager {
    /// Directory where segments are stored
    data_dir: PathBuf,

    /// Archived segments, oldest first
    archived: Vec<ArchivedSegment>,

    /// The segment accepting writes this session
    active: ActiveSegment,
}

impl SegmentManager {
    /// Start building a manager for `data_dir`
    pub fn builder(data_dir: &Path) -> SegmentManagerBuilder {
        SegmentManagerBuilder {
            data_dir: data_dir.to_path_buf(),
            archived: Vec::new(),
        }
    }

    /// List segment files in `dir`, oldest first
    ///
    /// Only regular files with the segment extension count. Names are
    /// timestamps, so lexical order is creation order.
    pub fn list_candidate_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file()
                && file_path.extension().and_then(|e| e.to_str()) == Some(SEGMENT_EXTENSION)
            {
                files.push(file_path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Resolve a segment id to a readable handle
    pub fn resolve(&mut self, id: SegmentId) -> Result<SegmentHandle<'_>> {
        match id {
            SegmentId::Archived(index) => self
                .archived
                .get(index)
                .map(SegmentHandle::Archived)
                .ok_or(CaskError::UnknownSegment(index)),
            SegmentId::Active => Ok(SegmentHandle::Active(&mut self.active)),
        }
    }

    pub fn active(&self) -> &ActiveSegment {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveSegment {
        &mut self.active
    }

    pub fn archived(&self) -> &[ArchivedSegment] {
        &self.archived
    }

    pub fn archived_count(&self) -> usize {
        self.archived.len()
    }

    /// Archived segments plus the active one
    pub fn segment_count(&self) -> usize {
        self.archived.len() + 1
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Sync the active segment and release every handle
    pub fn close_all(mut self) -> Result<()> {
        self.active.sync()?;
        tracing::debug!(
            "Closing {} archived segments and active segment {}",
            self.archived.len(),
            self.active.path().display()
        );
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Generate segment path given a directory and stamp
    fn segment_path(dir: &Path, stamp: u64) -> PathBuf {
        dir.join(format!("{:020}.{}", stamp, SEGMENT_EXTENSION))
    }

    /// Parse the stamp from a segment filename
    /// "01760000000000000042.data" → Some(1760000000000000042)
    fn parse_segment_stamp(path: &Path) -> Option<u64> {
        path.file_stem()?.to_str()?.parse().ok()
    }
}

/// Nanoseconds since the Unix epoch, saturating at `u64::MAX`
fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
