//! Error types for CaskKV
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using CaskError
pub type Result<T> = std::result::Result<T, CaskError>;

/// Unified error type for CaskKV operations
#[derive(Debug, Error)]
pub enum CaskError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record / Recovery Errors
    // -------------------------------------------------------------------------
    #[error("Truncated record at offset {offset}")]
    TruncatedRecord { offset: u64 },

    #[error("Record corruption detected: {0}")]
    Corruption(String),

    #[error("Recovery failed for segment {}: {source}", .segment.display())]
    Recovery {
        segment: PathBuf,
        #[source]
        source: Box<CaskError>,
    },

    #[error("Record too large: {0} bytes")]
    RecordTooLarge(usize),

    // -------------------------------------------------------------------------
    // Write Errors
    // -------------------------------------------------------------------------
    #[error("Short write: only {written}/{expected} bytes written")]
    ShortWrite { written: usize, expected: usize },

    #[error("Failed to roll back partial write to offset {offset}: {source}")]
    RollbackFailed {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Read Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error(
        "Incomplete read for key {:?}: expected {expected} bytes, got {read}",
        String::from_utf8_lossy(.key)
    )]
    IncompleteRead {
        key: Vec<u8>,
        expected: u64,
        read: u64,
    },

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    #[error("Segment file already exists: {}", .0.display())]
    SegmentExists(PathBuf),

    #[error("Unknown archived segment id: {0}")]
    UnknownSegment(usize),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
