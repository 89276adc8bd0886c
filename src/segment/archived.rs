//! Archived segment
//!
//! A read-only segment left behind by an earlier session.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::record::{read_full, SegmentScanner};

/// A segment opened for random-access reads only
#[derive(Debug)]
pub struct ArchivedSegment {
    /// Position in the startup listing
    id: usize,
    path: PathBuf,
    file: File,
    /// Size at open time; archived segments never grow
    len: u64,
}

impl ArchivedSegment {
    pub(super) fn open(id: usize, path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            id,
            path: path.to_path_buf(),
            file,
            len,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start a fresh scan of this segment from offset 0
    pub fn scan(&self, buffer_size: usize) -> Result<SegmentScanner<&File>> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(0))?;
        Ok(SegmentScanner::with_capacity(buffer_size, file, self.len))
    }

    /// Positioned read; returns the number of bytes read
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset))?;
        Ok(read_full(&mut file, buf)?)
    }
}
