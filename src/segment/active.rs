//! Active segment
//!
//! The single append-only segment written during a session.

use std::fs::OpenOptions;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{CaskError, Result};
use crate::record::read_full;

use super::SegmentIo;

/// The segment accepting writes for the current session
///
/// Also readable, so keys written this session can be fetched.
pub struct ActiveSegment {
    path: PathBuf,
    io: Box<dyn SegmentIo>,
    /// Length of the fully written prefix; the next frame starts here
    write_offset: u64,
    sync_strategy: SyncStrategy,
    /// Frames appended since the last fsync
    unsynced: usize,
}

impl std::fmt::Debug for ActiveSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSegment")
            .field("path", &self.path)
            .field("write_offset", &self.write_offset)
            .field("sync_strategy", &self.sync_strategy)
            .field("unsynced", &self.unsynced)
            .finish()
    }
}

impl ActiveSegment {
    /// Create a brand-new segment file; fails if `path` already exists
    pub(super) fn create(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => CaskError::SegmentExists(path.to_path_buf()),
                _ => CaskError::Io(e),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            io: Box::new(file),
            write_offset: 0,
            sync_strategy,
            unsynced: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes of complete frames written so far
    pub fn len(&self) -> u64 {
        self.write_offset
    }

    pub fn is_empty(&self) -> bool {
        self.write_offset == 0
    }

    /// Append one complete frame, returning the offset it starts at
    ///
    /// On failure the segment is left exactly as long as before the call:
    /// - nothing written → the I/O error is returned unchanged
    /// - some bytes written → truncated back, then `ShortWrite`
    /// - truncate fails → `RollbackFailed`; segment state is undefined
    pub fn append(&mut self, frame: &[u8]) -> Result<u64> {
        let start = self.write_offset;
        let mut written = 0usize;

        let failure = loop {
            if written == frame.len() {
                break None;
            }
            match self.io.write(&frame[written..]) {
                Ok(0) => break Some(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Some(e),
            }
        };

        if let Some(e) = failure {
            if written == 0 {
                return Err(CaskError::Io(e));
            }
            tracing::warn!(
                "Partial append to {}: {}/{} bytes ({}), rolling back to offset {}",
                self.path.display(),
                written,
                frame.len(),
                e,
                start
            );
            self.rollback(start)?;
            return Err(CaskError::ShortWrite {
                written,
                expected: frame.len(),
            });
        }

        // A failed sync undoes the append as well.
        if let Err(e) = self.sync_after_append() {
            self.rollback(start)?;
            return Err(e);
        }

        self.write_offset = start + frame.len() as u64;
        Ok(start)
    }

    /// Positioned read; returns the number of bytes read
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.io.seek(SeekFrom::Start(offset))?;
        Ok(read_full(&mut *self.io, buf)?)
    }

    /// Force all appended frames to durable storage
    pub fn sync(&mut self) -> Result<()> {
        self.io.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Length of the underlying file as reported by the filesystem
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.io.file_len()?)
    }

    fn sync_after_append(&mut self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync(),
            SyncStrategy::EveryNWrites { count } => {
                self.unsynced += 1;
                if self.unsynced >= count {
                    self.sync()
                } else {
                    Ok(())
                }
            }
            SyncStrategy::OsManaged => Ok(()),
        }
    }

    fn rollback(&mut self, offset: u64) -> Result<()> {
        self.io.set_len(offset).map_err(|source| {
            tracing::error!(
                "Rollback of {} to offset {} failed: {}",
                self.path.display(),
                offset,
                source
            );
            CaskError::RollbackFailed { offset, source }
        })
    }

    /// Wrap the underlying file handle, e.g. to inject write failures
    #[cfg(test)]
    pub(crate) fn wrap_io<F>(&mut self, wrap: F)
    where
        F: FnOnce(Box<dyn SegmentIo>) -> Box<dyn SegmentIo>,
    {
        let inner = std::mem::replace(&mut self.io, Box::new(super::testing::Detached));
        self.io = wrap(inner);
    }
}
