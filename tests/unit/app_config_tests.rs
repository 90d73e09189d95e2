/*!
 * Tests for application configuration
 */

use anyhow::Result;
use subresync::app_config::{Config, LogLevel, TranslationProvider};
use crate::common;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.translation.api_key = "0123456789abcdef:fx".to_string();
    config
}

/// Test defaults match the documented values
#[test]
fn test_default_shouldUseDocumentedValues() {
    let config = Config::default();
    assert_eq!(config.source_language, "auto");
    assert_eq!(config.target_language, "TR");
    assert_eq!(config.translation.provider, TranslationProvider::DeepL);
    assert_eq!(config.translation.batch_size, 10);
    assert_eq!(config.jobs.poll_interval_ms, 500);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.auto_detect_source());
}

/// Test DeepL without an API key is rejected
#[test]
fn test_validate_withDeepLWithoutKey_shouldFail() {
    assert!(Config::default().validate().is_err());
    assert!(valid_config().validate().is_ok());
}

/// Test the mock provider needs no key
#[test]
fn test_validate_withMockProvider_shouldNotNeedKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    assert!(config.validate().is_ok());
}

/// Test invalid values are rejected
#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = valid_config();
    config.target_language = "XX".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.source_language = "qq".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.translation.formality = "casual".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.translation.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.jobs.max_concurrent_jobs = 0;
    assert!(config.validate().is_err());
}

/// Test partial JSON falls back to defaults per field
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"target_language": "DE", "translation": {"provider": "mock"}}"#)?;
    assert_eq!(config.target_language, "DE");
    assert_eq!(config.translation.provider, TranslationProvider::Mock);
    assert_eq!(config.translation.timeout_secs, 30);
    assert!(!config.segmentation.models.is_empty());
    Ok(())
}

/// Test a missing file is created with defaults and loads back
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.exists());

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.target_language, created.target_language);
    assert_eq!(loaded.segmentation.models, created.segmentation.models);
    Ok(())
}

/// Test the API key is masked for display
#[test]
fn test_maskedApiKey_shouldHideMiddle() {
    let config = valid_config();
    assert_eq!(config.translation.masked_api_key(), "01234567...f:fx");
    assert_eq!("deepl".parse::<TranslationProvider>().unwrap(), TranslationProvider::DeepL);
}
