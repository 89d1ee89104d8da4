//! HTTP Range header parsing
//!
//! Only the single-range form `bytes=<start>-<end>` is understood. The value
//! is split on `-`, so a multi-range request such as `bytes=0-9,20-29`
//! yields three parts and is rejected as malformed. A missing start means 0
//! and a missing end means the last byte; `bytes=-N` is therefore read as
//! `0-N`, not as a suffix range.

use thiserror::Error;

/// An inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a file of `size` bytes
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

/// Why a Range header could not be honoured
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid Range header format: {0}")]
    Malformed(String),

    #[error("invalid range start: {0}")]
    InvalidStart(String),

    #[error("invalid range end: {0}")]
    InvalidEnd(String),

    /// Syntactically valid but outside the file
    #[error("range not satisfiable")]
    Unsatisfiable,
}

/// Parse a Range header against a file of `size` bytes
pub fn parse_range(header: &str, size: u64) -> Result<ByteRange, RangeError> {
    let value = header.strip_prefix("bytes=").unwrap_or(header);
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 2 {
        return Err(RangeError::Malformed(header.to_string()));
    }

    // i64 so that an empty file gives end = -1 and fails the bounds check
    let size = i64::try_from(size).map_err(|_| RangeError::Unsatisfiable)?;

    let start: i64 = if parts[0].is_empty() {
        0
    } else {
        parts[0]
            .parse()
            .map_err(|_| RangeError::InvalidStart(parts[0].to_string()))?
    };

    let end: i64 = if parts[1].is_empty() {
        size - 1
    } else {
        parts[1]
            .parse()
            .map_err(|_| RangeError::InvalidEnd(parts[1].to_string()))?
    };

    if start < 0 || end >= size || start > end {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(ByteRange {
        start: start as u64,
        end: end as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_range() {
        let range = parse_range("bytes=0-9", 100).unwrap();
        assert_eq!(range, ByteRange { start: 0, end: 9 });
        assert_eq!(range.len(), 10);
        assert_eq!(range.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_parse_open_end() {
        assert_eq!(
            parse_range("bytes=90-", 100).unwrap(),
            ByteRange { start: 90, end: 99 }
        );
    }

    #[test]
    fn test_parse_missing_start_defaults_to_zero() {
        assert_eq!(
            parse_range("bytes=-4", 100).unwrap(),
            ByteRange { start: 0, end: 4 }
        );
        assert_eq!(
            parse_range("bytes=-", 100).unwrap(),
            ByteRange { start: 0, end: 99 }
        );
    }

    #[test]
    fn test_parse_last_byte() {
        assert_eq!(
            parse_range("bytes=99-99", 100).unwrap(),
            ByteRange { start: 99, end: 99 }
        );
    }

    #[test]
    fn test_unsatisfiable() {
        assert_eq!(parse_range("bytes=0-100", 100), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=10-5", 100), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=100-", 100), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=0-0", 0), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range("bytes=-", 0), Err(RangeError::Unsatisfiable));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            parse_range("bytes=0-9,20-29", 100),
            Err(RangeError::Malformed(_))
        ));
        assert!(matches!(
            parse_range("bytes=5", 100),
            Err(RangeError::Malformed(_))
        ));
        assert!(matches!(
            parse_range("bytes=abc-9", 100),
            Err(RangeError::InvalidStart(_))
        ));
        assert!(matches!(
            parse_range("bytes=0-xyz", 100),
            Err(RangeError::InvalidEnd(_))
        ));
        assert!(matches!(
            parse_range("items=0-9", 100),
            Err(RangeError::InvalidStart(_))
        ));
    }
}
