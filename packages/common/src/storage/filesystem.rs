use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::ObjectStore;

/// Filesystem-backed object store.
///
/// Objects live at `{root}/{key}`; writes go through a temp file in
/// `{root}/.tmp` followed by a rename, so a `put` over an existing key
/// atomically replaces it and a crashed write leaves no partial object.
/// Public URLs are `{base_url}/{key}` — the server is expected to serve
/// the root directory at that prefix.
pub struct FilesystemObjectStore {
    root: PathBuf,
    base_url: String,
    max_size: u64,
}

impl FilesystemObjectStore {
    pub async fn new(
        root: PathBuf,
        base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(StorageError::Backend(
                "filesystem store requires a public base URL".into(),
            ));
        }
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn object_path(&self, key: &ObjectKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let object_path = self.object_path(key);
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StorageError> {
        match fs::read(self.object_path(key)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.object_path(key)).await?)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        match fs::remove_file(self.object_path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, key: &ObjectKey) -> Result<String, StorageError> {
        Ok(format!("{}/{key}", self.base_url))
    }
}
