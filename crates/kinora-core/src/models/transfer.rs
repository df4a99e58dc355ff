//! Messages exchanged by the streaming upload and download calls.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Session metadata carried by the first inbound upload message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHeader {
    pub record_id: Uuid,
    pub file_name: String,
    /// Declared size. Advisory only.
    pub total_size: Option<u64>,
}

/// One inbound upload message.
#[derive(Debug, Clone)]
pub enum UploadChunk {
    Header(UploadHeader),
    Data(Bytes),
}

/// Final outbound message of a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadOutcome {
    pub record_id: Uuid,
    pub storage_path: String,
    pub url: String,
    /// Bytes actually received
    pub size: u64,
}

/// A download call's single inbound request.
///
/// `end < 0` means "through the last byte".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub record_id: Uuid,
    pub owner_id: String,
    pub start: i64,
    pub end: i64,
}

/// Inclusive byte window clamped to an object's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Clamp a requested `[start, end]` window against an object of `size` bytes.
    ///
    /// A negative `end`, or one at or past the end of the object, becomes `size - 1`.
    /// Fails with `InvalidInput("invalid range")` unless the resulting length is positive
    /// and `start` is non-negative.
    pub fn resolve(start: i64, end: i64, size: u64) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidInput("invalid range".to_string());

        let start = u64::try_from(start).map_err(|_| invalid())?;
        if start >= size {
            return Err(invalid());
        }
        let end = match u64::try_from(end) {
            Ok(end) if end < size => end,
            _ => size - 1,
        };
        if end < start {
            return Err(invalid());
        }

        Ok(ByteRange { start, end })
    }

    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for an object of `size` bytes.
    pub fn content_range_header(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_range_within_object() {
        let range = ByteRange::resolve(10, 19, 100).unwrap();
        assert_eq!(range, ByteRange { start: 10, end: 19 });
        assert_eq!(range.content_length(), 10);
        assert_eq!(range.content_range_header(100), "bytes 10-19/100");
    }

    #[test]
    fn test_end_clamps_to_last_byte() {
        assert_eq!(ByteRange::resolve(0, -1, 100).unwrap().end, 99);
        assert_eq!(ByteRange::resolve(90, 100, 100).unwrap().end, 99);
        assert_eq!(ByteRange::resolve(90, 5000, 100).unwrap().content_length(), 10);
    }

    #[test]
    fn test_single_byte_range() {
        let range = ByteRange::resolve(99, 99, 100).unwrap();
        assert_eq!(range.content_length(), 1);
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        let err = ByteRange::resolve(50, 10, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "Invalid input: invalid range");
    }

    #[test]
    fn test_start_past_end_of_object_is_invalid() {
        let err = ByteRange::resolve(100, -1, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_empty_object_has_no_valid_range() {
        assert!(ByteRange::resolve(0, -1, 0).is_err());
        assert!(ByteRange::resolve(0, 0, 0).is_err());
    }

    #[test]
    fn test_negative_start_is_invalid() {
        assert!(ByteRange::resolve(-5, 10, 100).is_err());
    }

    #[test]
    fn test_extreme_bounds_do_not_overflow() {
        let err = ByteRange::resolve(i64::MIN, 5, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(ByteRange::resolve(i64::MIN, i64::MIN, 100).is_err());
        assert!(ByteRange::resolve(i64::MAX, i64::MAX, 100).is_err());

        let range = ByteRange::resolve(0, i64::MAX, 100).unwrap();
        assert_eq!(range.end, 99);

        let range = ByteRange::resolve(0, -1, u64::MAX).unwrap();
        assert_eq!(range.end, u64::MAX - 1);
    }
}
