use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Separator between bucket and key in a persisted compound reference.
pub const REFERENCE_SEPARATOR: char = ',';

/// Compound reference to a published object, persisted as `"<bucket>,<key>"`.
///
/// The persisted string is a durable format: `to_string` followed by `parse`
/// reproduces the bucket and key exactly. Neither part may be empty and
/// neither may contain the separator; keys may contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoReference {
    bucket: String,
    key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("compound reference has no bucket/key separator")]
    MissingSeparator,

    #[error("compound reference has an empty bucket")]
    EmptyBucket,

    #[error("compound reference has an empty key")]
    EmptyKey,

    #[error("compound reference part contains the separator: {0}")]
    SeparatorInPart(String),
}

impl VideoReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, ReferenceError> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() {
            return Err(ReferenceError::EmptyBucket);
        }
        if key.is_empty() {
            return Err(ReferenceError::EmptyKey);
        }
        if bucket.contains(REFERENCE_SEPARATOR) {
            return Err(ReferenceError::SeparatorInPart(bucket));
        }
        if key.contains(REFERENCE_SEPARATOR) {
            return Err(ReferenceError::SeparatorInPart(key));
        }
        Ok(Self { bucket, key })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for VideoReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (bucket, key) = s
            .split_once(REFERENCE_SEPARATOR)
            .ok_or(ReferenceError::MissingSeparator)?;
        Self::new(bucket, key)
    }
}

impl Display for VideoReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}{}", self.bucket, REFERENCE_SEPARATOR, self.key)
    }
}
