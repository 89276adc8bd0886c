//! Segment Module
//!
//! Owns every segment file of a store.
//!
//! ## Responsibilities
//! - Discover existing segment files on startup, oldest first
//! - Open them read-only as archived segments (ids 0, 1, 2, ...)
//! - Create exactly one fresh active segment per session
//! - Resolve a [`SegmentId`](crate::keydir::SegmentId) to a readable handle
//!
//! ## Naming
//! ```text
//! {data_dir}/{nanos:020}.data
//! ```
//! `nanos` is a nanosecond Unix timestamp, zero-padded so lexical order
//! equals creation order.

mod active;
mod archived;
mod manager;

use std::fs::File;
use std::io::{self, Read, Seek, Write};

pub use active::ActiveSegment;
pub use archived::ArchivedSegment;
pub use manager::{SegmentHandle, SegmentManager, SegmentManagerBuilder};

/// File extension of segment files
pub const SEGMENT_EXTENSION: &str = "data";

/// File primitives the active segment needs from the filesystem
///
/// Implemented for [`File`]. Tests substitute wrappers to simulate
/// failing or short writes.
pub trait SegmentIo: Read + Write + Seek + Send {
    /// Truncate or extend the file to `len` bytes
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Flush file contents to durable storage
    fn sync_data(&mut self) -> io::Result<()>;

    /// Current length of the file on disk
    fn file_len(&self) -> io::Result<u64>;
}

impl SegmentIo for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn file_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}
