//! Byte-range streaming
//!
//! Maps a content identifier to file bytes:
//! - Identifier validation and library lookup
//! - Root containment check (lexical, then after resolving symlinks)
//! - Single-range `Range: bytes=<start>-<end>` parsing
//! - Status, headers and a bounded byte source for the response

pub mod content_type;
pub mod engine;
pub mod range;

pub use content_type::content_type_for;
pub use engine::{ByteSource, StreamEngine, StreamResponse, DEFAULT_MAX_RANGE_SIZE};
pub use range::{parse_range, ByteRange, RangeError};
