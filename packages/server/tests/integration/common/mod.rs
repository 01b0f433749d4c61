use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{GrayImage, Luma, Rgb, RgbImage};
use reqwest::Client;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;

use ::common::storage::filesystem::FilesystemObjectStore;
use server::config::{
    AppConfig, CorsConfig, DatabaseConfig, InferenceConfig, PostprocessConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
use server::cutout::CutoutMode;
use server::inference::{
    Classification, Classifier, CrackType, InferenceError, Segmenter, Severity,
};
use server::state::AppState;

pub mod routes {
    pub const ANALYSES: &str = "/api/v1/analyses";

    pub fn egg(user_id: &str) -> String {
        format!("/api/v1/users/{user_id}/egg")
    }

    pub fn cracks(user_id: &str) -> String {
        format!("/api/v1/users/{user_id}/cracks")
    }
}

/// Fresh in-memory database with the schema synced.
///
/// A single pooled connection keeps every query on the same in-memory
/// SQLite instance.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory database");
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await
        .expect("Failed to sync schema");
    db
}

/// Filesystem object store rooted in a scratch dir.
pub async fn test_store(dir: &TempDir) -> Arc<FilesystemObjectStore> {
    Arc::new(
        FilesystemObjectStore::new(
            dir.path().join("segments"),
            "http://blobs.test/segments",
            16 * 1024 * 1024,
        )
        .await
        .expect("Failed to create object store"),
    )
}

/// Count stored objects for one user, ignoring the store's temp dir.
pub fn stored_segment_count(dir: &TempDir, user_id: &str) -> usize {
    let user_dir = dir.path().join("segments").join(user_id);
    match std::fs::read_dir(user_dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

pub fn linear_severity_1() -> Classification {
    Classification {
        crack_type: CrackType::Linear,
        severity: Severity::new(1).unwrap(),
    }
}

/// A small PNG-encoded cut-out stand-in for direct repository calls.
pub fn sample_segment_png() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Segmenter stub answering a uniform mask and counting invocations.
pub struct StubSegmenter {
    pub mask_value: u8,
    pub calls: Arc<AtomicUsize>,
}

impl StubSegmenter {
    pub fn new(mask_value: u8) -> Self {
        Self {
            mask_value,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Segmenter for StubSegmenter {
    async fn segment(&self, image: &RgbImage) -> Result<GrayImage, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GrayImage::from_pixel(
            image.width(),
            image.height(),
            Luma([self.mask_value]),
        ))
    }
}

/// Classifier stub answering a fixed verdict.
pub struct StubClassifier {
    pub verdict: Classification,
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, _image: &RgbImage) -> Result<Classification, InferenceError> {
        Ok(self.verdict)
    }
}

/// Segmenter stub that always fails, for error propagation tests.
pub struct FailingSegmenter;

#[async_trait]
impl Segmenter for FailingSegmenter {
    async fn segment(&self, _image: &RgbImage) -> Result<GrayImage, InferenceError> {
        Err(InferenceError::Backend("sidecar unreachable".into()))
    }
}

fn test_config(storage_root: PathBuf) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig {
                allow_origins: vec![],
                max_age: 3600,
            },
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::Filesystem,
            root: storage_root,
            base_url: "http://blobs.test/segments".to_string(),
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            max_blob_size: 16 * 1024 * 1024,
        },
        inference: InferenceConfig {
            segment_url: "http://127.0.0.1:8500/segment".to_string(),
            classify_url: "http://127.0.0.1:8500/classify".to_string(),
            timeout_secs: 5,
        },
        postprocess: PostprocessConfig {
            mode: CutoutMode::DarkKeep,
            threshold: None,
        },
    }
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, body }
    }
}

/// A running test server with stubbed capabilities.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub scratch: TempDir,
}

impl TestApp {
    /// Spawn with a full-coverage mask and a fixed Linear/1 verdict.
    pub async fn spawn() -> Self {
        Self::spawn_with(
            Arc::new(StubSegmenter::new(255)),
            Arc::new(StubClassifier {
                verdict: linear_severity_1(),
            }),
        )
        .await
    }

    pub async fn spawn_with(
        segmenter: Arc<dyn Segmenter>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let db = test_db().await;
        let scratch = tempfile::tempdir().unwrap();
        let store = test_store(&scratch).await;
        let config = test_config(scratch.path().join("segments"));

        let state = AppState::new(db.clone(), store, segmenter, classifier, config);
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            scratch,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("Failed to send POST request");
        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");
        TestResponse::from_response(res).await
    }

    /// Write a decodable sample photo into the scratch dir and return its
    /// path for use as an `image_ref`.
    pub fn write_sample_photo(&self, name: &str) -> String {
        let path = self.scratch.path().join(name);
        RgbImage::from_pixel(8, 8, Rgb([120, 120, 120]))
            .save(&path)
            .unwrap();
        path.to_str().unwrap().to_string()
    }
}
