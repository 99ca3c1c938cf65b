//! Lock record definitions.

use super::token::LockToken;
use crate::paths;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// Beyond this a `Second-N` timeout is indistinguishable from infinite.
const MAX_TIMEOUT_SECS: i64 = 1 << 40;

/// Scope of a write lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockScope {
    /// At most one per resource, never alongside a shared lock.
    Exclusive,
    /// Any number may coexist on a resource.
    Shared,
}

impl LockScope {
    /// Element name used in lock bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockScope::Exclusive => "exclusive",
            LockScope::Shared => "shared",
        }
    }

    /// Parse a `lockscope` value; `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Some(LockScope::Exclusive),
            "shared" => Some(LockScope::Shared),
            _ => None,
        }
    }

    /// Whether a lock of this scope and one of `other` may coexist on a resource.
    pub fn is_compatible_with(&self, other: LockScope) -> bool {
        *self == LockScope::Shared && other == LockScope::Shared
    }
}

/// How far a lock reaches below its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockDepth {
    /// Only the lock root.
    Zero,
    /// The lock root and every descendant.
    Infinite,
}

impl LockDepth {
    /// Value used in the `depth` element of lock discovery.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockDepth::Zero => "0",
            LockDepth::Infinite => "infinity",
        }
    }
}

/// Requested or remaining lifetime of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTimeout {
    /// Expires this many seconds after `created`.
    Seconds(u64),
    /// Never expires; only UNLOCK or deletion removes it.
    Infinite,
}

impl std::fmt::Display for LockTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockTimeout::Seconds(secs) => write!(f, "Second-{}", secs),
            LockTimeout::Infinite => f.write_str("Infinite"),
        }
    }
}

/// A lock record as held in the lock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Unique token identifying this lock.
    pub token: LockToken,

    /// Normalized lock root.
    pub path: String,

    /// Exclusive or shared.
    pub scope: LockScope,

    /// Zero or infinite.
    pub depth: LockDepth,

    /// Owner value supplied by the client, echoed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Lifetime measured from `created`.
    pub timeout: LockTimeout,

    /// When the lock was created or last refreshed.
    pub created: DateTime<Utc>,
}

impl LockInfo {
    /// Create a new lock with a freshly generated token.
    pub fn new(
        path: &str,
        scope: LockScope,
        depth: LockDepth,
        owner: Option<String>,
        timeout: LockTimeout,
    ) -> Self {
        Self {
            token: LockToken::generate(),
            path: paths::normalize(path),
            scope,
            depth,
            owner,
            timeout,
            created: Utc::now(),
        }
    }

    /// When the lock stops being valid, or `None` for infinite locks.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.timeout {
            LockTimeout::Seconds(secs) => {
                let secs = i64::try_from(secs)
                    .unwrap_or(MAX_TIMEOUT_SECS)
                    .min(MAX_TIMEOUT_SECS);
                self.created.checked_add_signed(Duration::seconds(secs))
            }
            LockTimeout::Infinite => None,
        }
    }

    /// Whether the lock has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// Whether the lock has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Remaining lifetime at `now`, for lock discovery.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> LockTimeout {
        match self.expires_at() {
            Some(at) => {
                let left = at.signed_duration_since(now).num_seconds().max(0);
                LockTimeout::Seconds(left as u64)
            }
            None => LockTimeout::Infinite,
        }
    }

    /// Whether this lock applies to `path` (its root, or a descendant when depth is infinite).
    pub fn covers(&self, path: &str) -> bool {
        match self.depth {
            LockDepth::Zero => self.path == path,
            LockDepth::Infinite => paths::is_within(path, &self.path),
        }
    }

    /// Reset the lifetime. Scope, depth and owner never change.
    pub fn refresh(&mut self, timeout: LockTimeout) {
        self.timeout = timeout;
        self.created = Utc::now();
    }
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, depth {}, owner: {}, timeout: {})",
            self.path,
            self.scope.as_str(),
            self.depth.as_str(),
            self.owner.as_deref().unwrap_or("-"),
            self.remaining_at(Utc::now())
        )
    }
}
