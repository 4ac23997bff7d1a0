//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use serial_test::serial;
use std::env;

use story_author::config::{Config, LogFormat, StorageBackend};
use story_author::AppError;

#[test]
#[serial]
fn test_config_from_env_loads_successfully() {
    let result = Config::from_env();
    assert!(result.is_ok(), "Config::from_env() should succeed");
}

#[test]
#[serial]
fn test_config_from_env_sqlite_backend() {
    env::set_var("STORY_BACKEND", "sqlite");

    let config = Config::from_env().unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);

    env::remove_var("STORY_BACKEND");
}

#[test]
#[serial]
fn test_config_from_env_invalid_backend() {
    env::set_var("STORY_BACKEND", "mongo");

    let result = Config::from_env();
    assert!(matches!(result, Err(AppError::Config { .. })));

    env::remove_var("STORY_BACKEND");
}

#[test]
#[serial]
fn test_config_from_env_custom_story_file() {
    env::set_var("STORY_FILE", "/tmp/stories/mine.json");

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.storage.snapshot_path.to_str().unwrap(),
        "/tmp/stories/mine.json"
    );

    env::remove_var("STORY_FILE");
}

#[test]
#[serial]
fn test_config_from_env_custom_database() {
    env::set_var("DATABASE_PATH", "/custom/path.db");
    env::set_var("DATABASE_MAX_CONNECTIONS", "10");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.path.to_str().unwrap(), "/custom/path.db");
    assert_eq!(config.database.max_connections, 10);

    env::remove_var("DATABASE_PATH");
    env::remove_var("DATABASE_MAX_CONNECTIONS");
}

#[test]
#[serial]
fn test_config_from_env_bad_max_connections_falls_back() {
    env::set_var("DATABASE_MAX_CONNECTIONS", "many");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database.max_connections, 5);

    env::remove_var("DATABASE_MAX_CONNECTIONS");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    env::set_var("LOG_FORMAT", "JSON");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::remove_var("LOG_FORMAT");
}

#[test]
#[serial]
fn test_config_from_env_load_on_start() {
    env::set_var("STORY_LOAD_ON_START", "true");
    assert!(Config::from_env().unwrap().session.load_on_start);

    env::set_var("STORY_LOAD_ON_START", "no");
    assert!(!Config::from_env().unwrap().session.load_on_start);

    env::remove_var("STORY_LOAD_ON_START");
}
