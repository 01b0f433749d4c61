use std::sync::Arc;
use std::sync::atomic::Ordering;

use image::{Rgb, RgbImage};

use server::cutout::CutoutMode;
use server::error::AppError;
use server::inference::{Classification, CrackType, Severity};
use server::pipeline::{AnalysisOutcome, AnalysisPipeline};
use server::repository::FindingRepository;

use crate::common::{self, FailingSegmenter, StubClassifier, StubSegmenter};

fn photo_png() -> Vec<u8> {
    let image = RgbImage::from_pixel(8, 8, Rgb([120, 120, 120]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

struct Setup {
    pipeline: AnalysisPipeline,
    repository: FindingRepository,
    segmenter_calls: Arc<std::sync::atomic::AtomicUsize>,
    scratch: tempfile::TempDir,
}

async fn setup(verdict: Classification) -> Setup {
    let db = common::test_db().await;
    let scratch = tempfile::tempdir().unwrap();
    let store = common::test_store(&scratch).await;
    let repository = FindingRepository::new(db, store);

    let segmenter = Arc::new(StubSegmenter::new(255));
    let segmenter_calls = segmenter.calls.clone();
    let pipeline = AnalysisPipeline::new(
        segmenter,
        Arc::new(StubClassifier { verdict }),
        repository.clone(),
        CutoutMode::DarkKeep,
        CutoutMode::DarkKeep.default_threshold(),
    );

    Setup {
        pipeline,
        repository,
        segmenter_calls,
        scratch,
    }
}

#[tokio::test]
async fn detected_crack_is_registered_and_aggregated() {
    let s = setup(common::linear_severity_1()).await;
    s.repository.provision_egg("u1").await.unwrap();

    let outcome = s
        .pipeline
        .analyze("u1", "/photos/road.png", &photo_png(), 35.0, 139.0)
        .await
        .unwrap();

    match outcome {
        AnalysisOutcome::Registered {
            segment_url,
            crack_type,
            severity,
            segment_urls,
        } => {
            assert!(segment_url.starts_with("http://blobs.test/segments/u1/segment_"));
            assert_eq!(crack_type, CrackType::Linear);
            assert_eq!(severity, Severity::new(1).unwrap());
            assert_eq!(segment_urls, vec![segment_url]);
        }
        AnalysisOutcome::NoDefect => panic!("expected a registered finding"),
    }

    assert_eq!(common::stored_segment_count(&s.scratch, "u1"), 1);
}

#[tokio::test]
async fn no_defect_short_circuits_without_touching_storage() {
    let verdict = Classification {
        crack_type: CrackType::Other,
        severity: Severity::new(0).unwrap(),
    };
    // Deliberately no egg: if the pipeline reached the repository, it
    // would fail with NotFound instead of succeeding.
    let s = setup(verdict).await;

    let outcome = s
        .pipeline
        .analyze("u1", "/photos/road.png", &photo_png(), 35.0, 139.0)
        .await
        .unwrap();

    assert!(matches!(outcome, AnalysisOutcome::NoDefect));
    assert_eq!(s.segmenter_calls.load(Ordering::SeqCst), 1);
    assert_eq!(common::stored_segment_count(&s.scratch, "u1"), 0);
}

#[tokio::test]
async fn segmenter_failure_surfaces_as_inference_error() {
    let db = common::test_db().await;
    let scratch = tempfile::tempdir().unwrap();
    let store = common::test_store(&scratch).await;
    let repository = FindingRepository::new(db, store);

    let pipeline = AnalysisPipeline::new(
        Arc::new(FailingSegmenter),
        Arc::new(StubClassifier {
            verdict: common::linear_severity_1(),
        }),
        repository,
        CutoutMode::DarkKeep,
        128,
    );

    let result = pipeline
        .analyze("u1", "/photos/road.png", &photo_png(), 35.0, 139.0)
        .await;
    assert!(matches!(result, Err(AppError::Inference(_))));
}

#[tokio::test]
async fn undecodable_image_is_an_input_error() {
    let s = setup(common::linear_severity_1()).await;

    let result = s
        .pipeline
        .analyze("u1", "/photos/road.png", b"not an image", 35.0, 139.0)
        .await;
    assert!(matches!(result, Err(AppError::Input(_))));
    assert_eq!(s.segmenter_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn out_of_range_coordinates_fail_before_inference() {
    let s = setup(common::linear_severity_1()).await;

    let result = s
        .pipeline
        .analyze("u1", "/photos/road.png", &photo_png(), 95.0, 139.0)
        .await;
    assert!(matches!(result, Err(AppError::Input(_))));
    assert_eq!(s.segmenter_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repository_failure_is_not_downgraded_to_no_defect() {
    // Linear verdict but no egg provisioned: the pipeline must surface
    // NotFound, never answer the null payload.
    let s = setup(common::linear_severity_1()).await;

    let result = s
        .pipeline
        .analyze("u1", "/photos/road.png", &photo_png(), 35.0, 139.0)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
