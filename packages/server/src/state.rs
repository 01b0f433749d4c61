use std::sync::Arc;

use common::storage::filesystem::FilesystemObjectStore;
use common::storage::s3::{S3ObjectStore, S3Settings};
use common::storage::{ObjectStore, StorageError};
use sea_orm::DatabaseConnection;

use crate::config::{AppConfig, StorageBackend, StorageConfig};
use crate::inference::{Classifier, Segmenter};
use crate::pipeline::AnalysisPipeline;
use crate::repository::FindingRepository;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub repository: FindingRepository,
    pub pipeline: Arc<AnalysisPipeline>,
    pub http: reqwest::Client,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<dyn ObjectStore>,
        segmenter: Arc<dyn Segmenter>,
        classifier: Arc<dyn Classifier>,
        config: AppConfig,
    ) -> Self {
        let repository = FindingRepository::new(db.clone(), store);
        let pipeline = Arc::new(AnalysisPipeline::new(
            segmenter,
            classifier,
            repository.clone(),
            config.postprocess.mode,
            config.postprocess.effective_threshold(),
        ));

        Self {
            db,
            repository,
            pipeline,
            http: reqwest::Client::new(),
            config,
        }
    }
}

/// Build the configured object store backend.
pub async fn build_object_store(
    config: &StorageConfig,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    match config.backend {
        StorageBackend::Filesystem => {
            let store = FilesystemObjectStore::new(
                config.root.clone(),
                config.base_url.clone(),
                config.max_blob_size,
            )
            .await?;
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let store = S3ObjectStore::new(&S3Settings {
                bucket: config.bucket.clone(),
                region: config.region.clone(),
                endpoint: config.endpoint.clone(),
                access_key: config.access_key.clone(),
                secret_key: config.secret_key.clone(),
                public_base_url: config.base_url.clone(),
                max_size: config.max_blob_size,
            })?;
            Ok(Arc::new(store))
        }
    }
}
