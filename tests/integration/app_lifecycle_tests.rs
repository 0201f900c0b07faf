/*!
 * Integration tests for the application controller entry points
 */

use std::fs;
use std::sync::Arc;

use pdftrans::app_controller::{Controller, TranslateRequest, TranslationMode};
use pdftrans::errors::{PipelineError, ReassemblyError};
use pdftrans::pipeline::RunStatus;
use pdftrans::providers::mock::{MockBackend, MockBehavior};
use pdftrans::reassembly::ReassemblyOptions;

use crate::common;

fn controller(config: pdftrans::Config, backend: &MockBackend) -> Controller {
    Controller::with_config(config)
        .unwrap()
        .with_backend(Arc::new(backend.clone()))
}

#[test]
fn test_chooseMode_shouldFollowThresholds() {
    let dir = common::create_temp_dir().unwrap();
    let small = common::create_test_pdf(dir.path(), "small.pdf", 30).unwrap();
    let large = common::create_test_pdf(dir.path(), "large.pdf", 31).unwrap();
    let controller = controller(common::test_config(dir.path()), &MockBackend::working());

    assert_eq!(controller.choose_mode(&small, false).unwrap(), (TranslationMode::Single, 30));
    assert_eq!(controller.choose_mode(&large, false).unwrap(), (TranslationMode::Chunked, 31));
    assert_eq!(controller.choose_mode(&small, true).unwrap(), (TranslationMode::Chunked, 30));
}

#[tokio::test]
async fn test_run_withSmallDocument_shouldUseSingleCall() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "memo.pdf", 5).unwrap();
    let output_root = dir.path().join("out");
    let backend = MockBackend::working();

    let report = controller(common::test_config(&output_root), &backend)
        .run(TranslateRequest::new(&input))
        .await
        .unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(report.status, RunStatus::Complete);
    let mono = report.mono.clone().unwrap();
    assert_eq!(mono, output_root.join("japanese/memo/memo_japanese_translated.pdf"));
    assert_eq!(common::page_labels(&mono), common::expected_labels(1..=5));
}

#[tokio::test]
async fn test_run_withForcedChunking_shouldSplitSmallDocument() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "memo.pdf", 5).unwrap();
    let output_root = dir.path().join("out");
    let mut config = common::test_config(&output_root);
    config.chunking.pages_per_chunk = 2;
    let backend = MockBackend::working();

    let mut request = TranslateRequest::new(&input);
    request.force_chunking = true;
    let report = controller(config, &backend).run(request).await.unwrap();

    assert_eq!(backend.call_count(), 3);
    assert_eq!(report.chunks_processed(), 3);
    assert_eq!(
        common::page_labels(report.dual.as_deref().unwrap()),
        common::expected_labels(1..=5)
    );
    assert!(output_root.join("japanese/memo/chunk_003").is_dir());
}

#[tokio::test]
async fn test_run_withLargeDocument_shouldChunkAutomatically() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "thesis.pdf", 45).unwrap();
    let output_root = dir.path().join("out");
    let mut config = common::test_config(&output_root);
    config.chunking.max_concurrent_chunks = 2;
    let backend = MockBackend::working().with_chunk_behavior(3, MockBehavior::Failing);

    let mut request = TranslateRequest::new(&input);
    request.output = Some(dir.path().join("thesis_ja.pdf"));
    let report = controller(config, &backend).run(request).await.unwrap();

    assert_eq!(backend.call_count(), 3);
    assert_eq!(report.status, RunStatus::Partial);
    assert_eq!(
        common::page_labels(&dir.path().join("thesis_ja.pdf")),
        common::expected_labels(1..=40)
    );
}

#[tokio::test]
async fn test_run_withUnreachableBackend_shouldFailBeforeSplitting() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "memo.pdf", 45).unwrap();
    let output_root = dir.path().join("out");
    let mut config = common::test_config(&output_root);
    config.translation.common.preflight = true;
    let backend = MockBackend::working().unreachable();

    let error = controller(config, &backend)
        .run(TranslateRequest::new(&input))
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<PipelineError>(),
        Some(PipelineError::BackendUnavailable(_))
    ));
    assert_eq!(backend.call_count(), 0);
    assert!(!output_root.exists());
}

#[test]
fn test_run_withMissingInput_shouldBeInvalidInput() {
    let dir = common::create_temp_dir().unwrap();
    let backend = MockBackend::working();
    let controller = controller(common::test_config(dir.path()), &backend);

    let error = tokio_test::block_on(async {
        controller
            .run(TranslateRequest::new(dir.path().join("nope.pdf")))
            .await
            .unwrap_err()
    });

    assert!(matches!(
        error.downcast_ref::<PipelineError>(),
        Some(PipelineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_run_withAllChunksFailing_shouldReturnNoOutputProduced() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "thesis.pdf", 45).unwrap();
    let backend = MockBackend::failing();

    let error = controller(common::test_config(&dir.path().join("out")), &backend)
        .run(TranslateRequest::new(&input))
        .await
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<PipelineError>(),
        Some(PipelineError::NoOutputProduced { chunks: 3 })
    ));
}

#[tokio::test]
async fn test_runMerge_shouldReassembleEarlierChunkDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_test_pdf(dir.path(), "thesis.pdf", 45).unwrap();
    let output_root = dir.path().join("out");
    let backend = MockBackend::new(MockBehavior::MonoOnly);
    let controller = controller(common::test_config(&output_root), &backend);

    let mut request = TranslateRequest::new(&input);
    request.force_chunking = true;
    controller.run(request).await.unwrap();

    let project_dir = output_root.join("japanese");
    let summary = controller
        .run_merge(
            &project_dir,
            &ReassemblyOptions {
                keep_originals: true,
                ..ReassemblyOptions::default()
            },
        )
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.outputs, vec![project_dir.join("thesis_translated_merged.pdf")]);
    assert_eq!(
        common::page_labels(&summary.outputs[0]),
        common::expected_labels(1..=45)
    );
    assert!(output_root.join("japanese/thesis/chunk_001/chunk_001_japanese_translated.pdf").is_file());
}

#[test]
fn test_runMerge_withEmptyDirectory_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    fs::create_dir_all(dir.path().join("nothing")).unwrap();
    let controller = controller(common::test_config(dir.path()), &MockBackend::working());

    let error = controller
        .run_merge(&dir.path().join("nothing"), &ReassemblyOptions::default())
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<ReassemblyError>(),
        Some(ReassemblyError::NoChunkGroups(_))
    ));
}
