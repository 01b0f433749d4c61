use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::cutout::{self, CutoutMode};
use crate::error::AppError;
use crate::imaging;
use crate::inference::{Classifier, CrackType, Segmenter, Severity};
use crate::models::shared::validate_coordinates;
use crate::repository::{FindingRepository, NewFinding};

/// Result of one analysis run.
pub enum AnalysisOutcome {
    /// The classifier saw no crack; nothing was stored.
    NoDefect,
    Registered {
        segment_url: String,
        crack_type: CrackType,
        severity: Severity,
        /// Cut-out URLs of every crack in the user's egg, insertion order.
        segment_urls: Vec<String>,
    },
}

/// The ingestion pipeline: decode, segment, classify, cut out, persist,
/// aggregate.
///
/// Holds no state between requests; every side effect lives in the
/// capabilities and the repository.
pub struct AnalysisPipeline {
    segmenter: Arc<dyn Segmenter>,
    classifier: Arc<dyn Classifier>,
    repository: FindingRepository,
    mode: CutoutMode,
    threshold: u8,
}

impl AnalysisPipeline {
    pub fn new(
        segmenter: Arc<dyn Segmenter>,
        classifier: Arc<dyn Classifier>,
        repository: FindingRepository,
        mode: CutoutMode,
        threshold: u8,
    ) -> Self {
        Self {
            segmenter,
            classifier,
            repository,
            mode,
            threshold,
        }
    }

    /// Analyze one submitted photo for the given user.
    ///
    /// Capability and repository failures propagate as-is — a real error
    /// is never downgraded to the no-defect response.
    #[instrument(skip(self, image_bytes), fields(user_id = %user_id))]
    pub async fn analyze(
        &self,
        user_id: &str,
        source_ref: &str,
        image_bytes: &[u8],
        latitude: f64,
        longitude: f64,
    ) -> Result<AnalysisOutcome, AppError> {
        validate_coordinates(latitude, longitude)?;
        let photo = imaging::decode_rgb(image_bytes)?;

        let mask = self.segmenter.segment(&photo).await?;
        debug!(width = mask.width(), height = mask.height(), "segmented");

        // Classification grades the segmented region, not the raw photo.
        let segmented_rgb = imaging::gray_to_rgb(&mask);
        let classification = self.classifier.classify(&segmented_rgb).await?;
        debug!(
            crack_type = %classification.crack_type,
            severity = %classification.severity,
            "classified"
        );

        if classification.crack_type.is_no_defect() {
            info!("no defect detected");
            return Ok(AnalysisOutcome::NoDefect);
        }

        let cut = cutout::cutout(&mask, self.mode, self.threshold);
        let segment_png = cutout::encode_png(&cut)
            .map_err(|e| AppError::Internal(format!("cut-out encoding failed: {e}")))?;

        let registered = self
            .repository
            .register_finding(NewFinding {
                user_id: user_id.to_string(),
                source_ref: source_ref.to_string(),
                segment_png,
                classification,
                latitude,
                longitude,
            })
            .await?;

        let segment_urls = self
            .repository
            .record_in_egg(user_id, registered.crack_id)
            .await?;

        Ok(AnalysisOutcome::Registered {
            segment_url: registered.segment_url,
            crack_type: classification.crack_type,
            severity: classification.severity,
            segment_urls,
        })
    }
}
