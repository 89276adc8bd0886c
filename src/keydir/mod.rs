//! KeyDir Module
//!
//! In-memory index from key to the location of its latest value.
//!
//! ## Responsibilities
//! - Point lookups by exact key bytes
//! - Unconditional overwrite on insert (last caller wins)
//! - Never persisted; rebuilt from segments on every open
//!
//! ## Data Structure Choice
//! A plain `HashMap` with no internal locking. All access goes through
//! the store's single lock.

mod table;

pub use table::KeyDir;

/// Which segment a value lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    /// An archived segment, by its position in the startup listing
    Archived(usize),

    /// The active segment of the current session
    Active,
}

/// Location of the most recent value for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub segment: SegmentId,
    /// Offset of the first value byte inside the segment
    pub value_offset: u64,
    pub value_len: u64,
    /// Seconds since the Unix epoch when the record was written
    pub timestamp: i64,
}
