//! Constants shared across crates.

/// Content type accepted for video uploads and used for published objects.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// File extension of published video objects.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Multipart field carrying the video payload.
pub const VIDEO_FORM_FIELD: &str = "video";

/// Issuer written into and required from access tokens.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Number of random bytes behind each object key token.
pub const OBJECT_KEY_TOKEN_BYTES: usize = 32;
