use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tracing::debug;

use super::error::StorageError;
use super::key::ObjectKey;
use super::traits::ObjectStore;

/// Connection settings for an S3-compatible object store.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// URL prefix under which the bucket contents are publicly readable.
    pub public_base_url: String,
    pub max_size: u64,
}

/// Object store backed by any S3-compatible service (MinIO, Supabase
/// storage, AWS). The bucket must be configured for public reads; the
/// service itself never proxies object downloads.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    public_base_url: String,
    max_size: u64,
}

impl S3ObjectStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        if settings.public_base_url.trim().is_empty() {
            return Err(StorageError::Backend(
                "s3 store requires a public base URL".into(),
            ));
        }

        let region = Region::Custom {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .with_path_style();

        Ok(Self {
            bucket,
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
            max_size: settings.max_size,
        })
    }
}

fn backend_err(err: S3Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &ObjectKey,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object_with_content_type(key.as_str(), data, content_type)
            .await
            .map_err(backend_err)?;

        match response.status_code() {
            200 | 201 => {
                debug!(key = %key, "uploaded object");
                Ok(())
            }
            code => Err(StorageError::Backend(format!(
                "upload of {key} failed with status {code}"
            ))),
        }
    }

    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StorageError> {
        match self.bucket.get_object(key.as_str()).await {
            Ok(response) => Ok(response.to_vec()),
            Err(S3Error::HttpFailWithBody(404, _)) => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn exists(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        match self.bucket.head_object(key.as_str()).await {
            Ok((_, 200)) => Ok(true),
            Ok((_, _)) => Ok(false),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool, StorageError> {
        match self.bucket.delete_object(key.as_str()).await {
            Ok(_) => Ok(true),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend_err(e)),
        }
    }

    fn public_url(&self, key: &ObjectKey) -> Result<String, StorageError> {
        Ok(format!("{}/{key}", self.public_base_url))
    }
}
