/*!
 * Tests for application configuration functionality
 */

use langbridge::app_config::{Config, DetectionBackend, LogLevel, MAX_RETRY_COUNT, TranslationProvider};
use std::str::FromStr;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.validation.min_word_length, 1);
    assert_eq!(config.validation.max_word_length, 45);
    assert_eq!(config.validation.min_sentence_length, 3);
    assert_eq!(config.validation.max_sentence_length, 5000);
    assert!(!config.validation.gate_single_text);
    assert_eq!(config.detection.backend, DetectionBackend::Whatlang);
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.batch.max_concurrent_rows, 1);
    assert_eq!(config.log_level, LogLevel::Info);

    let ollama_config = config
        .translation
        .get_provider_config(&TranslationProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama_config.endpoint, "http://localhost:11434");
    assert_eq!(ollama_config.timeout_secs, 30);
}

#[test]
fn test_config_validation_withDefaults_shouldPass() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_config_validation_withInvertedBounds_shouldFail() {
    let mut config = Config::default();
    config.validation.min_word_length = 50;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.validation.min_sentence_length = 10;
    config.validation.max_sentence_length = 5;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_withUnknownLanguageCode_shouldFail() {
    let mut config = Config::default();
    config.translation.supported_source_languages = vec!["fr".to_string(), "french".to_string()];
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.detection.allowlist = vec!["zz".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_withAnthropicWithoutKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    assert!(config.validate().is_err());

    config.translation.provider_config_mut(TranslationProvider::Anthropic).api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.batch.max_concurrent_rows = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_withExcessiveRetries_shouldFail() {
    let mut config = Config::default();
    config.translation.common.retry_count = MAX_RETRY_COUNT;
    assert!(config.validate().is_ok());

    config.translation.common.retry_count = 70;
    assert!(config.validate().is_err());
}

#[test]
fn test_default_detection_allowlist_shouldCoverNewsLanguages() {
    let config = Config::default();
    for code in ["en", "fr", "es"] {
        assert!(config.detection.allowlist.iter().any(|c| c == code), "missing {}", code);
    }

    let config: Config = serde_json::from_str(r#"{ "detection": { "serialize_access": true } }"#).unwrap();
    assert_eq!(config.detection.allowlist, Config::default().detection.allowlist);

    let config: Config = serde_json::from_str(r#"{ "detection": { "allowlist": [] } }"#).unwrap();
    assert!(config.detection.allowlist.is_empty());
}

#[test]
fn test_partial_json_withMissingSections_shouldFillDefaults() {
    let config: Config = serde_json::from_str(
        r#"{ "validation": { "min_sentence_length": 2 }, "translation": { "provider": "anthropic" } }"#,
    )
    .unwrap();

    assert_eq!(config.validation.min_sentence_length, 2);
    assert_eq!(config.validation.max_word_length, 45);
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.get_model(), "claude-3-haiku-20240307");
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
}

#[test]
fn test_provider_from_str_shouldAcceptKnownNames() {
    assert_eq!(TranslationProvider::from_str("Ollama").unwrap(), TranslationProvider::Ollama);
    assert_eq!(TranslationProvider::from_str("anthropic").unwrap(), TranslationProvider::Anthropic);
    assert!(TranslationProvider::from_str("openai").is_err());
    assert_eq!(TranslationProvider::Anthropic.to_string(), "anthropic");
}

#[test]
fn test_save_and_load_withTempFile_shouldRoundTrip() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("conf.json");

    let mut config = Config::default();
    config.batch.max_concurrent_rows = 4;
    config.translation.supported_source_languages = vec!["fr".to_string()];
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.batch.max_concurrent_rows, 4);
    assert_eq!(loaded.translation.supported_source_languages, vec!["fr".to_string()]);
    Ok(())
}

#[test]
fn test_from_file_withInvalidJson_shouldReturnError() -> anyhow::Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", b"{ not json")?;

    assert!(Config::from_file(&path).is_err());
    Ok(())
}
