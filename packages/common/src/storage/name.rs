use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::StorageError;

const MAX_SEGMENT_LEN: usize = 255;

/// Validates a single flat path segment (a bucket or object name).
fn check_segment(segment: &str) -> Result<(), StorageError> {
    if segment.is_empty() {
        return Err(StorageError::InvalidName("name cannot be empty".into()));
    }
    if segment.len() > MAX_SEGMENT_LEN {
        return Err(StorageError::InvalidName(format!(
            "name exceeds {MAX_SEGMENT_LEN} bytes"
        )));
    }
    // Control characters would leak into Content-Type headers and log lines.
    if segment.chars().any(|c| c.is_ascii_control()) {
        return Err(StorageError::InvalidName(
            "control characters are not allowed".into(),
        ));
    }
    if segment.contains('/') || segment.contains('\\') {
        return Err(StorageError::InvalidName(
            "path separators are not allowed".into(),
        ));
    }
    if segment.starts_with('.') {
        return Err(StorageError::InvalidName(
            "names starting with '.' are not allowed".into(),
        ));
    }
    Ok(())
}

/// Validates a bucket name, e.g. `"products"`.
pub fn validate_bucket(bucket: &str) -> Result<&str, StorageError> {
    check_segment(bucket)?;
    Ok(bucket)
}

/// A validated object name inside a bucket.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

impl ObjectName {
    /// Parse an object name coming from a client.
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        let name = name.trim();
        check_segment(name)?;
        Ok(Self(name.to_owned()))
    }

    /// Generate a random object name that keeps the extension of `original`.
    ///
    /// Uploaded files never keep their client-side name, so two users
    /// uploading `logo.png` do not overwrite each other.
    pub fn randomized(original: Option<&str>) -> Self {
        let stem = uuid::Uuid::new_v4().to_string();
        let ext = original
            .and_then(|o| Path::new(o).extension())
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase());

        match ext {
            Some(ext) => Self(format!("{stem}.{ext}")),
            None => Self(stem),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectName({})", self.0)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ObjectName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.0
    }
}
