//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for a davlock root.
///
/// This struct represents the contents of `.davlock/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock store
    // =========================================================================
    /// Which lock store backs the engine.
    #[serde(default)]
    pub lock_backend: LockBackend,

    /// File name of the JSON lock table inside `.davlock/` (file backend only).
    #[serde(default = "default_lock_db")]
    pub lock_db: String,

    // =========================================================================
    // Timeouts
    // =========================================================================
    /// Timeout in seconds for LOCK requests without a Timeout header.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,

    /// Upper bound for granted timeouts. `Infinite` requests are clamped too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout_secs: Option<u64>,

    // =========================================================================
    // Logging
    // =========================================================================
    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_backend: LockBackend::default(),
            lock_db: default_lock_db(),
            default_timeout_secs: default_timeout_secs(),
            max_timeout_secs: None,
            log_level: default_log_level(),
        }
    }
}
