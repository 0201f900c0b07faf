/*!
 * Tests for backend construction and the chunk translator
 */

use std::sync::Arc;

use pdftrans::app_config::{Engine, TranslationConfig};
use pdftrans::errors::PipelineError;
use pdftrans::providers::mock::{MockBackend, MockBehavior};
use pdftrans::providers::{PromptLanguages, create_backend};
use pdftrans::translation::{ArtifactKind, ChunkTranslator, LanguagePair, TranslationOutcome};

use crate::common;

fn languages() -> PromptLanguages<'static> {
    PromptLanguages {
        source_name: "English",
        target_name: "Japanese",
    }
}

#[test]
fn test_createBackend_withDefaultEngine_shouldUsePdf2zh() {
    let config = TranslationConfig::default();
    let backend = create_backend(&config, languages()).unwrap();

    assert_eq!(backend.engine(), Engine::Default);
    assert!(!backend.shares_quota());
}

#[test]
fn test_createBackend_withApiEngineAndNoKey_shouldBeUnavailable() {
    for engine in [Engine::OpenAI, Engine::Gemini, Engine::Claude] {
        let mut config = TranslationConfig::default();
        config.engine = engine;
        config.get_or_insert_engine_config(engine).api_key = String::new();

        let result = create_backend(&config, languages());
        assert!(
            matches!(result, Err(PipelineError::BackendUnavailable(_))),
            "engine {} should be unavailable",
            engine
        );
    }
}

#[test]
fn test_createBackend_withApiKey_shouldBuildApiBackend() {
    let mut config = TranslationConfig::default();
    config.engine = Engine::Claude;
    config.get_or_insert_engine_config(Engine::Claude).api_key = "sk-ant-test".to_string();

    let backend = create_backend(&config, languages()).unwrap();
    assert_eq!(backend.engine(), Engine::Claude);
    assert!(backend.shares_quota());
}

#[tokio::test]
async fn test_translateChunk_withFailingBackend_shouldReturnFailed() {
    let dir = common::create_temp_dir().unwrap();
    let chunk = common::create_test_pdf(dir.path(), "chunk_001.pdf", 2).unwrap();
    let translator = ChunkTranslator::new(
        Arc::new(MockBackend::failing()),
        LanguagePair {
            source_code: "en".to_string(),
            target_code: "ja".to_string(),
        },
    );

    let outcome = translator.translate_chunk(&chunk, &dir.path().join("work")).await;
    assert!(outcome.is_failed());
    assert!(outcome.failure_reason().unwrap().contains("Simulated backend failure"));
}

#[tokio::test]
async fn test_translateChunk_withMonoOnlyBackend_shouldReportNativeMono() {
    let dir = common::create_temp_dir().unwrap();
    let chunk = common::create_test_pdf(dir.path(), "chunk_004.pdf", 1).unwrap();
    let backend = MockBackend::new(MockBehavior::MonoOnly);
    let translator = ChunkTranslator::new(
        Arc::new(backend.clone()),
        LanguagePair {
            source_code: "en".to_string(),
            target_code: "fr".to_string(),
        },
    );

    let work = dir.path().join("work");
    let outcome = translator.translate_chunk(&chunk, &work).await;

    assert_eq!(outcome, TranslationOutcome::MonoProduced(work.join("chunk_004-mono.pdf")));
    assert_eq!(outcome.artifact(ArtifactKind::Dual), None);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_translateChunk_withSilentBackend_shouldReportNoOutput() {
    let dir = common::create_temp_dir().unwrap();
    let chunk = common::create_test_pdf(dir.path(), "chunk_001.pdf", 1).unwrap();
    let translator = ChunkTranslator::new(
        Arc::new(MockBackend::silent()),
        LanguagePair {
            source_code: "en".to_string(),
            target_code: "fr".to_string(),
        },
    );

    let outcome = translator.translate_chunk(&chunk, &dir.path().join("work")).await;
    assert_eq!(outcome.failure_reason(), Some("no output produced"));
}
