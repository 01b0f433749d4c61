use std::path::PathBuf;

use axum::http::HeaderValue;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::cutout::CutoutMode;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

impl CorsConfig {
    /// Build the CORS layer. An empty origin list means any origin, which
    /// mirrors the permissive middleware of the original deployment.
    pub fn layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(std::time::Duration::from_secs(self.max_age));

        if self.allow_origins.is_empty() {
            layer.allow_origin(Any)
        } else {
            let origins: Vec<HeaderValue> = self
                .allow_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            layer.allow_origin(origins)
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Filesystem,
    S3,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Filesystem backend: directory that holds uploaded cut-outs.
    pub root: PathBuf,
    /// Public URL prefix under which stored objects are reachable.
    pub base_url: String,
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    pub max_blob_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Segmentation sidecar endpoint (PNG in, PNG mask out).
    pub segment_url: String,
    /// Classification sidecar endpoint (PNG in, JSON verdict out).
    pub classify_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostprocessConfig {
    pub mode: CutoutMode,
    /// Cut-out threshold; falls back to the mode's default when unset.
    pub threshold: Option<u8>,
}

impl PostprocessConfig {
    pub fn effective_threshold(&self) -> u8 {
        self.threshold.unwrap_or(self.mode.default_threshold())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub inference: InferenceConfig,
    pub postprocess: PostprocessConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.root", "./data/segments")?
            .set_default("storage.base_url", "http://127.0.0.1:3000/segments")?
            .set_default("storage.max_blob_size", 16 * 1024 * 1024i64)?
            .set_default("inference.segment_url", "http://127.0.0.1:8500/segment")?
            .set_default("inference.classify_url", "http://127.0.0.1:8500/classify")?
            .set_default("inference.timeout_secs", 30)?
            .set_default("postprocess.mode", "dark-keep")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CRACKLE__DATABASE__URL)
            .add_source(Environment::with_prefix("CRACKLE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
