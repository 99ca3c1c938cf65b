//! Configuration types and defaults for davlock.
//!
//! This module defines enums and default value functions used by the
//! Config struct.

use serde::{Deserialize, Serialize};

/// Where lock records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockBackend {
    /// No lock store: locking is disabled and every method passes the guard.
    None,
    /// Locks are kept in process memory and vanish on exit.
    Memory,
    /// Locks are persisted as JSON under the state directory (default).
    #[default]
    File,
}

impl LockBackend {
    /// Parse a backend name from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "memory" => Some(Self::Memory),
            "file" => Some(Self::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Memory => "memory",
            Self::File => "file",
        }
    }
}

/// Default file name of the JSON lock table.
pub fn default_lock_db() -> String {
    "locks.json".to_string()
}

/// Default lock timeout when a LOCK request carries no Timeout header: 30 minutes.
pub fn default_timeout_secs() -> u64 {
    1800
}

/// Default tracing filter.
pub fn default_log_level() -> String {
    "warn".to_string()
}
