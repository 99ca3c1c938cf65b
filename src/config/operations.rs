//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{DavLockError, Result};
use crate::locks::LockTimeout;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(DavLockError::BadRequest)` - Parse error or validation failure
    /// * `Err(DavLockError::Storage)` - The file could not be read
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            DavLockError::Storage(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path` if it exists, otherwise return defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| DavLockError::BadRequest(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| DavLockError::Storage(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `default_timeout_secs` must be positive
    /// - `max_timeout_secs`, when set, must be positive
    /// - `lock_db` must be a non-empty file name
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_secs == 0 {
            return Err(DavLockError::BadRequest(
                "config validation failed: default_timeout_secs must be greater than 0"
                    .to_string(),
            ));
        }

        if self.max_timeout_secs == Some(0) {
            return Err(DavLockError::BadRequest(
                "config validation failed: max_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.lock_db.trim().is_empty() {
            return Err(DavLockError::BadRequest(
                "config validation failed: lock_db must be non-empty".to_string(),
            ));
        }
        if self.lock_db.contains(['/', '\\']) {
            return Err(DavLockError::BadRequest(format!(
                "config validation failed: lock_db must be a file name, not a path (found '{}')",
                self.lock_db
            )));
        }

        Ok(())
    }

    /// Timeout granted for a LOCK request that asked for `requested`.
    ///
    /// Falls back to `default_timeout_secs` and clamps to `max_timeout_secs`.
    pub fn granted_timeout(&self, requested: Option<LockTimeout>) -> LockTimeout {
        let requested = requested.unwrap_or(LockTimeout::Seconds(self.default_timeout_secs));
        match (requested, self.max_timeout_secs) {
            (LockTimeout::Infinite, Some(max)) => LockTimeout::Seconds(max),
            (LockTimeout::Seconds(secs), Some(max)) => LockTimeout::Seconds(secs.min(max)),
            (requested, None) => requested,
        }
    }
}
