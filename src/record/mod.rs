//! Record Module
//!
//! The on-disk frame format shared by every segment file.
//!
//! ## Responsibilities
//! - Encode a key/value pair plus metadata into one frame
//! - Decode frame headers and keys without touching values
//! - Scan a whole segment lazily for index recovery
//!
//! ## Frame Format (little-endian, no padding)
//! ```text
//! ┌──────────────┬───────────────┬─────────────┬───────────────┬───────┬─────────┐
//! │ CRC32 (4)    │ Timestamp (8) │ KeyLen (8)  │ ValueLen (8)  │  Key  │  Value  │
//! │ u32, value   │ i64, seconds  │ i64         │ i64           │       │         │
//! └──────────────┴───────────────┴─────────────┴───────────────┴───────┴─────────┘
//!   offset 0       offset 4        offset 12     offset 20       28      28+KeyLen
//! ```
//!
//! Frame boundaries come only from parsing headers; there is no outer
//! length prefix and no trailer.

mod codec;
mod scanner;

pub use codec::{
    decode_header_and_key, encode, frame_len, skip_value, unix_timestamp, DecodedFrame,
    RecordHeader, HEADER_SIZE,
};
pub use scanner::{RecordLocation, SegmentScanner};

pub(crate) use codec::read_full;
