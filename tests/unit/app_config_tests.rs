/*!
 * Tests for configuration loading, validation and defaults
 */

use anyhow::Result;
use std::str::FromStr;

use subreflow::app_config::{Config, LogLevel, MergeConfig, ReflowConfig, TranslationProvider};
use crate::common::{create_temp_dir, create_test_file};

/// Test the documented defaults
#[test]
fn test_config_default_shouldUseDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "zh");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_model(), "llama3.2:3b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.common.batch_size, 10);
    assert_eq!(config.translation.common.batch_delay_ms, 500);
    assert_eq!(config.translation.common.retry_count, 2);
    assert_eq!(config.log_level, LogLevel::Info);

    assert_eq!(
        config.merge,
        MergeConfig {
            enabled: true,
            max_gap_ms: 300,
            max_duration_ms: 5000,
            max_chars: 150,
            ellipsis_is_terminal: true,
        }
    );
    assert_eq!(
        config.reflow,
        ReflowConfig {
            enabled: true,
            min_duration_ms: 1000,
            max_stretch: 1.5,
        }
    );
    assert!(config.validate().is_ok());
}

/// Test that a missing file is created with the defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.target_language, "zh");
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.merge, config.merge);
    Ok(())
}

/// Test that saved changes survive a reload
#[test]
fn test_save_thenLoad_shouldKeepChanges() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.merge.max_gap_ms = 750;
    config.reflow.enabled = false;
    config.translation.provider = TranslationProvider::OpenAI;
    config.translation.active_provider_config_mut().api_key = "sk-123".to_string();
    config.save(&path)?;

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.target_language, "fr");
    assert_eq!(loaded.merge.max_gap_ms, 750);
    assert!(!loaded.reflow.enabled);
    assert_eq!(loaded.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(loaded.translation.get_api_key(), "sk-123");
    Ok(())
}

/// Test that a partial file falls back to defaults for missing sections
#[test]
fn test_load_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "target_language": "es", "merge": { "max_chars": 80 } }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "es");
    assert_eq!(config.merge.max_chars, 80);
    assert_eq!(config.merge.max_gap_ms, 300);
    assert!(config.merge.enabled);
    assert_eq!(config.reflow.min_duration_ms, 1000);
    Ok(())
}

/// Test that malformed JSON is reported
#[test]
fn test_load_withMalformedFile_shouldFail() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let path = create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    let err = Config::load_or_create(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

/// Test validation failures
#[test]
fn test_validate_withBadValues_shouldFail() {
    let mut config = Config::default();
    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.common.batch_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.reflow.max_stretch = 0.5;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("API key is required"));
}

/// Test that a missing key fails only the credential check
#[test]
fn test_validate_settings_withMissingApiKey_shouldPass() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    assert!(config.validate_settings().is_ok());
    assert!(config.validate_credentials().is_err());

    config.translation.common.batch_size = 0;
    assert!(config.validate_settings().is_err());
}

/// Test provider name parsing
#[test]
fn test_translation_provider_fromStr_shouldAcceptKnownNames() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("lmstudio").unwrap(), TranslationProvider::LMStudio);
    assert!(TranslationProvider::from_str("gemini").is_err());

    assert_eq!(TranslationProvider::LMStudio.to_string(), "lmstudio");
    assert_eq!(TranslationProvider::LMStudio.display_name(), "LM Studio");
    assert!(TranslationProvider::OpenAI.requires_api_key());
    assert!(!TranslationProvider::Ollama.requires_api_key());
}

/// Test that a missing provider entry is created on demand
#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::LMStudio;

    config.translation.active_provider_config_mut().model = "qwen2.5-7b".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "qwen2.5-7b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
}

/// Test the log level mapping
#[test]
fn test_log_level_toLevelFilter_shouldMap() {
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
}
