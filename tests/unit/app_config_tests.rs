/*!
 * Tests for application configuration
 */

use anyhow::Result;

use digestr::app_config::{Config, LogLevel};
use crate::common;

#[test]
fn test_default_shouldMatchReferenceSettings() {
    let config = Config::default();
    assert_eq!(config.model.repo, "google-t5/t5-base");
    assert_eq!(config.model.revision, "main");
    assert_eq!(config.model.max_input_tokens, 512);
    assert_eq!(config.summarizer.max_words, 600);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(!config.model.force_cpu);
    assert!(!config.model.offline);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroMaxWords_shouldFail() {
    let mut config = Config::default();
    config.summarizer.max_words = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroInputTokens_shouldFail() {
    let mut config = Config::default();
    config.model.max_input_tokens = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadRepo_shouldFail() {
    for repo in ["", "  ", "owner/", "../escape", "owner//name"] {
        let mut config = Config::default();
        config.model.repo = repo.to_string();
        assert!(config.validate().is_err(), "repo {:?} should be rejected", repo);
    }
}

#[test]
fn test_validate_withNonHttpEndpoint_shouldFail() {
    let mut config = Config::default();
    config.model.endpoint = "ftp://models.example.com".to_string();
    assert!(config.validate().is_err());

    config.model.endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefault() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert_eq!(config, Config::default());
    assert!(path.exists());
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded, config);
    Ok(())
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "model": { "repo": "google-t5/t5-small", "force_cpu": true },
            "summarizer": { "max_words": 250 },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.model.repo, "google-t5/t5-small");
    assert!(config.model.force_cpu);
    assert_eq!(config.model.max_input_tokens, 512);
    assert_eq!(config.summarizer.max_words, 250);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
