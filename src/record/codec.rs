//! Record codec
//!
//! Encoding and decoding of individual frames.

use std::io::{self, BufReader, Read, Seek};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CaskError, Result};

/// Header size: CRC (4) + Timestamp (8) + KeyLen (8) + ValueLen (8) = 28 bytes
pub const HEADER_SIZE: u64 = 28;

/// Fixed-size metadata at the start of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// CRC32 (IEEE) over the value bytes only
    pub checksum: u32,

    /// Seconds since the Unix epoch at write time
    pub timestamp: i64,

    pub key_len: u64,

    pub value_len: u64,
}

impl RecordHeader {
    /// Parse a raw header. `frame_offset` is only used for error messages.
    fn parse(raw: &[u8; HEADER_SIZE as usize], frame_offset: u64) -> Result<Self> {
        let mut buf = &raw[..];
        let checksum = buf.get_u32_le();
        let timestamp = buf.get_i64_le();
        let key_len = buf.get_i64_le();
        let value_len = buf.get_i64_le();

        let key_len = u64::try_from(key_len).map_err(|_| {
            CaskError::Corruption(format!(
                "negative key length {} at offset {}",
                key_len, frame_offset
            ))
        })?;
        let value_len = u64::try_from(value_len).map_err(|_| {
            CaskError::Corruption(format!(
                "negative value length {} at offset {}",
                value_len, frame_offset
            ))
        })?;

        Ok(Self {
            checksum,
            timestamp,
            key_len,
            value_len,
        })
    }

    /// Total length of the frame this header starts
    pub fn frame_len(&self) -> Result<u64> {
        frame_len(self.key_len, self.value_len)
    }
}

/// A frame decoded up to (but not including) its value bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub header: RecordHeader,
    pub key: Vec<u8>,
    /// Absolute offset of the first value byte within the segment
    pub value_offset: u64,
}

/// Total frame length for the given key and value sizes
pub fn frame_len(key_len: u64, value_len: u64) -> Result<u64> {
    HEADER_SIZE
        .checked_add(key_len)
        .and_then(|n| n.checked_add(value_len))
        .ok_or_else(|| {
            CaskError::Corruption(format!(
                "frame length overflows: key {} bytes, value {} bytes",
                key_len, value_len
            ))
        })
}

/// Encode a key/value pair into a complete frame
///
/// Format: crc (4) + timestamp (8) + key_len (8) + value_len (8) + key + value
pub fn encode(key: &[u8], value: &[u8], timestamp: i64) -> Result<Bytes> {
    let key_len = i64::try_from(key.len()).map_err(|_| CaskError::RecordTooLarge(key.len()))?;
    let value_len =
        i64::try_from(value.len()).map_err(|_| CaskError::RecordTooLarge(value.len()))?;

    let capacity = (HEADER_SIZE as usize)
        .checked_add(key.len())
        .and_then(|n| n.checked_add(value.len()))
        .ok_or(CaskError::RecordTooLarge(value.len()))?;

    let mut frame = BytesMut::with_capacity(capacity);
    frame.put_u32_le(crc32fast::hash(value));
    frame.put_i64_le(timestamp);
    frame.put_i64_le(key_len);
    frame.put_i64_le(value_len);
    frame.put_slice(key);
    frame.put_slice(value);

    Ok(frame.freeze())
}

/// Decode the header and key of the frame starting at `frame_offset`
///
/// The stream must be positioned at a frame boundary. Returns:
/// - `Ok(None)`: stream exhausted exactly at the boundary
/// - `Ok(Some(frame))`: stream left positioned at the first value byte
/// - `Err(TruncatedRecord)`: stream ended inside the header or key
///
/// The checksum is carried through but not validated.
pub fn decode_header_and_key<R: Read>(
    stream: &mut R,
    frame_offset: u64,
) -> Result<Option<DecodedFrame>> {
    let mut raw = [0u8; HEADER_SIZE as usize];
    let filled = read_full(stream, &mut raw)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < raw.len() {
        return Err(CaskError::TruncatedRecord {
            offset: frame_offset,
        });
    }

    let header = RecordHeader::parse(&raw, frame_offset)?;

    // Bounded by the bytes actually present, so a garbage length cannot
    // trigger a huge allocation.
    let mut key = Vec::new();
    let read = stream.by_ref().take(header.key_len).read_to_end(&mut key)?;
    if (read as u64) < header.key_len {
        return Err(CaskError::TruncatedRecord {
            offset: frame_offset,
        });
    }

    let value_offset = frame_offset
        .checked_add(HEADER_SIZE + header.key_len)
        .ok_or_else(|| {
            CaskError::Corruption(format!("value offset overflows at offset {}", frame_offset))
        })?;

    Ok(Some(DecodedFrame {
        header,
        key,
        value_offset,
    }))
}

/// Advance past `value_len` bytes without reading them
pub fn skip_value<R: Read + Seek>(stream: &mut BufReader<R>, value_len: u64) -> Result<()> {
    let distance = i64::try_from(value_len).map_err(|_| {
        CaskError::Corruption(format!("value length {} cannot be skipped", value_len))
    })?;
    stream.seek_relative(distance)?;
    Ok(())
}

/// Current wall-clock time in whole seconds since the Unix epoch
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Read until `buf` is full or the stream is exhausted
///
/// Returns the number of bytes read; less than `buf.len()` only at EOF.
pub(crate) fn read_full<R: Read + ?Sized>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
