//! Shared constants for transfer and catalog behaviour.

use std::time::Duration;

/// Maximum payload of one outbound download frame.
pub const DOWNLOAD_FRAME_SIZE: usize = 64 * 1024;

/// Lifetime of the access URL attached to records returned by `GetMedia`.
pub const ACCESS_URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of presigned URLs handed out for direct client transfers.
pub const DIRECT_TRANSFER_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Listing limit applied when the caller does not send one.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Upper bound on a single listing page.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Content type used when the file extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// API route prefix.
pub const API_PREFIX: &str = "/api/v0";

/// Delay before a catalog write invalidates the record's cache entry a second time.
pub const CACHE_REINVALIDATE_DELAY: Duration = Duration::from_millis(500);
