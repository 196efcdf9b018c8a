//! Common utilities for the upload handler

/// Normalize MIME type by stripping parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate a part's content type against an allowlist. Compares the normalized
/// MIME type only, so parameters cannot be used to sneak past the check.
pub fn validate_content_type(content_type: Option<&str>, allowed_types: &[&str]) -> Result<(), String> {
    let Some(content_type) = content_type else {
        return Err("Missing content type for video part".to_string());
    };
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(format!(
            "Invalid file type. Allowed types: {}",
            allowed_types.join(", ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime_type_strips_parameters() {
        assert_eq!(normalize_mime_type("video/mp4; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_mime_type(" video/mp4 "), "video/mp4");
        assert_eq!(normalize_mime_type("video/mp4"), "video/mp4");
    }

    #[test]
    fn test_validate_content_type() {
        let allowed = ["video/mp4"];
        assert!(validate_content_type(Some("video/mp4"), &allowed).is_ok());
        assert!(validate_content_type(Some("VIDEO/MP4"), &allowed).is_ok());
        assert!(validate_content_type(Some("video/mp4;codecs=avc1"), &allowed).is_ok());
        assert!(validate_content_type(Some("image/png"), &allowed).is_err());
        assert!(validate_content_type(Some("video/quicktime"), &allowed).is_err());
        assert!(validate_content_type(Some(""), &allowed).is_err());
        assert!(validate_content_type(None, &allowed).is_err());
    }
}
