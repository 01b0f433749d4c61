use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;

/// Maximum key length accepted by any backend.
const MAX_KEY_LEN: usize = 512;

/// A validated, slash-separated object key.
///
/// Keys name objects within a bucket or a filesystem root and are embedded
/// verbatim into public URLs, so the accepted character set is deliberately
/// narrow and path traversal is rejected outright.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap a raw key string.
    pub fn new(key: &str) -> Result<Self, StorageError> {
        let key = key.trim();

        if key.is_empty() {
            return Err(StorageError::InvalidKey("key cannot be empty".into()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "key exceeds maximum length of {MAX_KEY_LEN} characters"
            )));
        }
        if key.starts_with('/') || key.ends_with('/') {
            return Err(StorageError::InvalidKey(
                "key must not start or end with '/'".into(),
            ));
        }
        for segment in key.split('/') {
            if segment.is_empty() {
                return Err(StorageError::InvalidKey(
                    "key must not contain empty segments".into(),
                ));
            }
            if segment == ".." || segment.starts_with('.') {
                return Err(StorageError::InvalidKey(
                    "key segments must not start with '.'".into(),
                ));
            }
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "key contains invalid characters (allowed: a-zA-Z0-9, /, -, _, .)".into(),
            ));
        }

        Ok(Self(key.to_string()))
    }

    /// Build the key for a user's stored segment cut-out.
    ///
    /// The id component makes keys collision-free under concurrent uploads
    /// for the same user; UUIDv7 keeps them time-ordered as a bonus.
    pub fn segment(user_id: &str, id: Uuid) -> Result<Self, StorageError> {
        Self::new(&format!("{user_id}/segment_{id}.png"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ObjectKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}
