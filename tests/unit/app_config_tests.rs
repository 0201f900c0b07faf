/*!
 * Tests for application configuration functionality
 */

use pdftrans::app_config::{Config, Engine, EngineConfig, LogLevel};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "english");
    assert_eq!(config.target_language, "japanese");
    assert_eq!(config.output_root, std::path::PathBuf::from("output"));
    assert_eq!(config.translation.engine, Engine::Default);
    assert_eq!(config.translation.common.rate_limit_delay_ms, 500);
    assert_eq!(config.translation.common.pdf2zh_command, "pdf2zh");
    assert!(config.translation.common.preflight);
    assert_eq!(config.chunking.pages_per_chunk, 20);
    assert_eq!(config.chunking.large_page_threshold, 30);
    assert_eq!(config.chunking.large_size_threshold_mb, 10);
    assert_eq!(config.chunking.max_concurrent_chunks, 1);
    assert_eq!(config.log_level, LogLevel::Info);

    let openai = config
        .translation
        .get_engine_config(&Engine::OpenAI)
        .expect("OpenAI engine config should exist");
    assert_eq!(openai.model, "gpt-4o");
    assert_eq!(openai.endpoint, "https://api.openai.com/v1");
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.target_language = "".to_string();
    assert!(config.validate().is_err());
    config.target_language = "german".to_string();

    config.chunking.pages_per_chunk = 0;
    assert!(config.validate().is_err());
    config.chunking.pages_per_chunk = 5;

    config.chunking.max_concurrent_chunks = 0;
    assert!(config.validate().is_err());
    config.chunking.max_concurrent_chunks = 2;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withApiEngineAndNoKey_shouldFail() {
    let mut config = Config::default();
    config.translation.engine = Engine::Claude;
    assert!(config.validate().is_err());

    config.translation.get_or_insert_engine_config(Engine::Claude).api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withMalformedEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.get_or_insert_engine_config(Engine::Gemini).endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_isLarge_shouldUsePageAndSizeThresholds() {
    let chunking = Config::default().chunking;
    assert!(!chunking.is_large(30, 1024));
    assert!(chunking.is_large(31, 1024));
    assert!(!chunking.is_large(5, 10 * 1024 * 1024));
    assert!(chunking.is_large(5, 10 * 1024 * 1024 + 1));
}

#[test]
fn test_largeSizeThreshold_withHugeMegabytes_shouldSaturate() {
    let mut chunking = Config::default().chunking;
    chunking.large_size_threshold_mb = u64::MAX;
    assert_eq!(chunking.large_size_threshold_bytes(), u64::MAX);
    assert!(!chunking.is_large(1, u64::MAX - 1));
}

#[test]
fn test_dispatchDelay_shouldOnlyApplyToApiEngines() {
    let mut config = Config::default();
    assert_eq!(config.translation.dispatch_delay_ms(), 0);

    config.translation.engine = Engine::OpenAI;
    assert_eq!(config.translation.dispatch_delay_ms(), 500);
}

#[test]
fn test_getModel_withEmptyModel_shouldFallBackToDefault() {
    let mut config = Config::default();
    config.translation.engine = Engine::Gemini;
    config.translation.get_or_insert_engine_config(Engine::Gemini).model = String::new();
    assert_eq!(config.translation.get_model(), "gemini-1.5-pro");
}

#[test]
fn test_engine_fromStr_shouldAcceptAliases() {
    assert_eq!("claude".parse::<Engine>().unwrap(), Engine::Claude);
    assert_eq!("Anthropic".parse::<Engine>().unwrap(), Engine::Claude);
    assert_eq!("OPENAI".parse::<Engine>().unwrap(), Engine::OpenAI);
    assert!("deepl".parse::<Engine>().is_err());
    assert_eq!(Engine::Gemini.to_string(), "gemini");
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("pdftrans.json");

    let (config, created) = Config::load_or_create(&path).unwrap();
    assert!(created);
    assert!(path.exists());
    assert_eq!(config.target_language, "japanese");

    let (reloaded, created_again) = Config::load_or_create(&path).unwrap();
    assert!(!created_again);
    assert_eq!(reloaded.chunking.pages_per_chunk, config.chunking.pages_per_chunk);
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "source_language": "english",
        "target_language": "french",
        "translation": {
            "engine": "openai",
            "available_engines": [{ "type": "openai", "api_key": "sk-abc" }]
        }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.translation.engine, Engine::OpenAI);
    assert_eq!(config.translation.get_api_key(), "sk-abc");
    assert_eq!(config.translation.get_timeout_secs(), 60);
    assert_eq!(config.chunking.pages_per_chunk, 20);
    assert_eq!(config.output_root, std::path::PathBuf::from("output"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_engineConfig_new_shouldUseEngineDefaults() {
    let claude = EngineConfig::new(Engine::Claude);
    assert_eq!(claude.engine_type, "claude");
    assert_eq!(claude.model, "claude-3-opus-20240229");
    assert_eq!(claude.endpoint, "https://api.anthropic.com");
    assert!(claude.api_key.is_empty());
}
