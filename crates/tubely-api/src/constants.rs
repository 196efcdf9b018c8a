//! API constants

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Route prefix under which the local backend serves signed objects
pub const ASSETS_PREFIX: &str = "/assets";

/// Allowance on top of the upload cap for multipart boundaries and headers,
/// so the staging copy rejects oversized videos before the body limit does.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;
