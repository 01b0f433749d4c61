use async_trait::async_trait;

use super::error::StorageError;
use super::key::ObjectKey;

/// Key-addressed object storage with publicly resolvable URLs.
///
/// `put` has upsert semantics: writing an existing key replaces the object,
/// so transient-failure retries of the same upload are safe.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under the given key, replacing any previous object.
    async fn put(&self, key: &ObjectKey, data: &[u8], content_type: &str)
    -> Result<(), StorageError>;

    /// Retrieve the full contents of an object.
    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError>;

    /// Durable public URL for an object.
    fn public_url(&self, key: &ObjectKey) -> Result<String, StorageError>;
}
