//! Object key generation and validation shared by all backends.
//!
//! Key format: `{classification}/{token}.mp4`, where the token is 32 bytes from
//! the thread-local CSPRNG encoded as unpadded URL-safe base64.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use tubely_core::constants::{OBJECT_KEY_TOKEN_BYTES, VIDEO_EXTENSION};
use tubely_core::models::REFERENCE_SEPARATOR;
use tubely_core::AspectClass;

/// Generate a fresh object key for a video of the given classification.
pub fn generate_object_key(aspect: AspectClass) -> String {
    let mut token = [0u8; OBJECT_KEY_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut token);
    format!(
        "{}/{}.{}",
        aspect.as_str(),
        URL_SAFE_NO_PAD.encode(token),
        VIDEO_EXTENSION
    )
}

/// Check that a key can be addressed by every backend and persisted in a
/// compound reference.
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key is empty".to_string());
    }
    if key.starts_with('/') {
        return Err("key must not start with '/'".to_string());
    }
    if key.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        return Err("key contains an empty or parent-directory segment".to_string());
    }
    if key.contains(REFERENCE_SEPARATOR) {
        return Err("key must not contain the reference separator".to_string());
    }
    if key.chars().any(|c| c.is_control() || c == '\\') {
        return Err("key contains invalid characters".to_string());
    }
    Ok(())
}

/// Check a bucket name used in a path or URL.
pub fn validate_bucket(bucket: &str) -> Result<(), String> {
    if bucket.is_empty() {
        return Err("bucket is empty".to_string());
    }
    if bucket == "." || bucket == ".." {
        return Err("bucket must not be a relative directory".to_string());
    }
    if !bucket
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("bucket contains invalid characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_has_classification_prefix_and_extension() {
        for (aspect, prefix) in [
            (AspectClass::Landscape, "landscape/"),
            (AspectClass::Portrait, "portrait/"),
            (AspectClass::Other, "other/"),
        ] {
            let key = generate_object_key(aspect);
            assert!(key.starts_with(prefix), "{key}");
            assert!(key.ends_with(".mp4"));
            validate_key(&key).unwrap();
        }
    }

    #[test]
    fn token_is_unpadded_url_safe_base64_of_32_bytes() {
        let key = generate_object_key(AspectClass::Other);
        let token = key
            .strip_prefix("other/")
            .and_then(|rest| rest.strip_suffix(".mp4"))
            .unwrap();
        // 32 bytes -> 43 characters without padding
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(URL_SAFE_NO_PAD.decode(token).unwrap().len(), 32);
    }

    #[test]
    fn keys_do_not_repeat() {
        let keys: HashSet<String> = (0..1000)
            .map(|_| generate_object_key(AspectClass::Landscape))
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn rejects_unsafe_keys() {
        for key in [
            "",
            "/landscape/a.mp4",
            "../etc/passwd",
            "landscape/../../a.mp4",
            "landscape//a.mp4",
            "landscape/a,b.mp4",
            "landscape\\a.mp4",
        ] {
            assert!(validate_key(key).is_err(), "{key:?} should be rejected");
        }
    }

    #[test]
    fn bucket_validation() {
        validate_bucket("tubely-videos").unwrap();
        validate_bucket("my.bucket_1").unwrap();
        assert!(validate_bucket("").is_err());
        assert!(validate_bucket("..").is_err());
        assert!(validate_bucket("a/b").is_err());
        assert!(validate_bucket("a,b").is_err());
    }
}
