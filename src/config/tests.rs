//! Tests for config functionality.

use crate::config::{Config, LockBackend};
use crate::error::DavLockError;
use crate::locks::LockTimeout;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.lock_backend, LockBackend::File);
    assert_eq!(config.lock_db, "locks.json");
    assert_eq!(config.default_timeout_secs, 1800);
    assert_eq!(config.max_timeout_secs, None);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    // Should use all defaults
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
lock_backend: memory
default_timeout_secs: 60
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lock_backend, LockBackend::Memory);
    assert_eq!(config.default_timeout_secs, 60);

    // Unspecified values should use defaults
    assert_eq!(config.lock_db, "locks.json");
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
lock_backend: none
lock_db: table.json
default_timeout_secs: 300
max_timeout_secs: 3600
log_level: debug
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lock_backend, LockBackend::None);
    assert_eq!(config.lock_db, "table.json");
    assert_eq!(config.default_timeout_secs, 300);
    assert_eq!(config.max_timeout_secs, Some(3600));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
lock_backend: memory
future_option: true
nested:
  thing: 1
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.lock_backend, LockBackend::Memory);
}

#[test]
fn test_invalid_backend_is_rejected() {
    let result = Config::from_yaml("lock_backend: redis\n");
    assert!(matches!(result, Err(DavLockError::BadRequest(_))));
}

#[test]
fn test_validation_rejects_zero_timeouts() {
    let err = Config::from_yaml("default_timeout_secs: 0\n").unwrap_err();
    assert!(err.to_string().contains("default_timeout_secs"));

    let err = Config::from_yaml("max_timeout_secs: 0\n").unwrap_err();
    assert!(err.to_string().contains("max_timeout_secs"));
}

#[test]
fn test_validation_rejects_bad_lock_db() {
    let err = Config::from_yaml("lock_db: ''\n").unwrap_err();
    assert!(err.to_string().contains("lock_db"));

    let err = Config::from_yaml("lock_db: ../elsewhere.json\n").unwrap_err();
    assert!(err.to_string().contains("file name"));
}

#[test]
fn test_yaml_round_trip() {
    let config = Config {
        lock_backend: LockBackend::Memory,
        max_timeout_secs: Some(120),
        ..Config::default()
    };
    let yaml = config.to_yaml().unwrap();
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_load_or_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");

    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

    std::fs::write(&path, "default_timeout_secs: 42\n").unwrap();
    assert_eq!(Config::load_or_default(&path).unwrap().default_timeout_secs, 42);
    assert_eq!(Config::load(&path).unwrap().default_timeout_secs, 42);
}

#[test]
fn test_load_missing_file_is_storage_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::load(temp_dir.path().join("nope.yaml"));
    assert!(matches!(result, Err(DavLockError::Storage(_))));
}

#[test]
fn test_granted_timeout_defaults_and_clamps() {
    let config = Config::default();
    assert_eq!(config.granted_timeout(None), LockTimeout::Seconds(1800));
    assert_eq!(
        config.granted_timeout(Some(LockTimeout::Infinite)),
        LockTimeout::Infinite
    );

    let config = Config {
        max_timeout_secs: Some(600),
        ..Config::default()
    };
    assert_eq!(config.granted_timeout(None), LockTimeout::Seconds(600));
    assert_eq!(
        config.granted_timeout(Some(LockTimeout::Seconds(100))),
        LockTimeout::Seconds(100)
    );
    assert_eq!(
        config.granted_timeout(Some(LockTimeout::Infinite)),
        LockTimeout::Seconds(600)
    );
}

#[test]
fn test_backend_names() {
    for backend in [LockBackend::None, LockBackend::Memory, LockBackend::File] {
        assert_eq!(LockBackend::from_str(backend.as_str()), Some(backend));
    }
    assert_eq!(LockBackend::from_str("redis"), None);
}
