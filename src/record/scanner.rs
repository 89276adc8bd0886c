//! Segment Scanner
//!
//! Lazily walks every frame of a segment, yielding keys and value
//! locations without reading the values themselves.

use std::io::{BufReader, Read, Seek};

use crate::error::{CaskError, Result};

use super::codec::{decode_header_and_key, skip_value};

/// Where a value lives inside the segment being scanned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLocation {
    pub value_offset: u64,
    pub value_len: u64,
    pub timestamp: i64,
}

/// Iterator over `(key, location)` pairs of one segment
///
/// The scan is single-pass: once it returns `None` or an error it stays
/// exhausted.
pub struct SegmentScanner<R: Read + Seek> {
    reader: BufReader<R>,
    /// Offset of the next frame boundary
    position: u64,
    /// Total bytes in the segment; a value reaching past this is truncated
    segment_len: u64,
    done: bool,
}

impl<R: Read + Seek> SegmentScanner<R> {
    /// Create a scanner over a stream positioned at offset 0
    pub fn new(stream: R, segment_len: u64) -> Self {
        Self::with_capacity(8 * 1024, stream, segment_len)
    }

    /// Create a scanner with a specific read buffer capacity
    pub fn with_capacity(capacity: usize, stream: R, segment_len: u64) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, stream),
            position: 0,
            segment_len,
            done: false,
        }
    }

    /// Offset of the next frame the scanner would decode
    pub fn position(&self) -> u64 {
        self.position
    }

    fn next_frame(&mut self) -> Result<Option<(Vec<u8>, RecordLocation)>> {
        let frame_offset = self.position;

        let frame = match decode_header_and_key(&mut self.reader, frame_offset)? {
            Some(frame) => frame,
            None => return Ok(None),
        };

        let value_end = frame
            .value_offset
            .checked_add(frame.header.value_len)
            .ok_or_else(|| {
                CaskError::Corruption(format!("value end overflows at offset {}", frame_offset))
            })?;

        // Seeking past EOF succeeds, so a short value is only visible
        // against the known segment length.
        if value_end > self.segment_len {
            return Err(CaskError::TruncatedRecord {
                offset: frame_offset,
            });
        }

        skip_value(&mut self.reader, frame.header.value_len)?;
        self.position = value_end;

        let location = RecordLocation {
            value_offset: frame.value_offset,
            value_len: frame.header.value_len,
            timestamp: frame.header.timestamp,
        };

        Ok(Some((frame.key, location)))
    }
}

impl<R: Read + Seek> Iterator for SegmentScanner<R> {
    type Item = Result<(Vec<u8>, RecordLocation)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_frame() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for SegmentScanner<R> {}
