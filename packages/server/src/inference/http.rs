use std::time::Duration;

use async_trait::async_trait;
use image::{GrayImage, RgbImage};
use serde::Deserialize;
use tracing::debug;

use super::{Classification, Classifier, CrackType, InferenceError, Segmenter, Severity};
use crate::config::InferenceConfig;

/// Client for the model sidecar service.
///
/// Both capabilities speak the same minimal protocol: the request body is
/// the PNG-encoded image, segmentation answers with a PNG mask and
/// classification with a JSON verdict. Calls are bounded by a single
/// configured timeout and are never retried here — a timed-out inference
/// is surfaced, not re-billed.
pub struct HttpInference {
    client: reqwest::Client,
    segment_url: String,
    classify_url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(rename = "type")]
    crack_type: String,
    severity: u8,
}

impl HttpInference {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            segment_url: config.segment_url.clone(),
            classify_url: config.classify_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn post_png(&self, url: &str, image: &RgbImage) -> Result<Vec<u8>, InferenceError> {
        let mut body = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut body, image::ImageFormat::Png)
            .map_err(|e| InferenceError::Payload(format!("failed to encode request image: {e}")))?;

        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(body.into_inner())
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| InferenceError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::Backend(format!(
                "{url} answered with status {status}"
            )));
        }

        let bytes = tokio::time::timeout(self.timeout, response.bytes())
            .await
            .map_err(|_| InferenceError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Segmenter for HttpInference {
    async fn segment(&self, image: &RgbImage) -> Result<GrayImage, InferenceError> {
        let bytes = self.post_png(&self.segment_url, image).await?;
        let mask = image::load_from_memory(&bytes)
            .map_err(|e| InferenceError::Payload(format!("mask is not a decodable image: {e}")))?
            .into_luma8();

        debug!(width = mask.width(), height = mask.height(), "received segmentation mask");
        Ok(mask)
    }
}

#[async_trait]
impl Classifier for HttpInference {
    async fn classify(&self, image: &RgbImage) -> Result<Classification, InferenceError> {
        let bytes = self.post_png(&self.classify_url, image).await?;
        let verdict: ClassifyResponse = serde_json::from_slice(&bytes)
            .map_err(|e| InferenceError::Payload(format!("verdict is not valid JSON: {e}")))?;

        let crack_type = CrackType::from_label(&verdict.crack_type).ok_or_else(|| {
            InferenceError::Payload(format!("unknown crack type label: {}", verdict.crack_type))
        })?;
        let severity = Severity::new(verdict.severity).ok_or_else(|| {
            InferenceError::Payload(format!("severity out of range: {}", verdict.severity))
        })?;

        Ok(Classification {
            crack_type,
            severity,
        })
    }
}
