//! Lock token generation and wire-format handling.

use crate::error::{DavLockError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// URI scheme used for every token this engine issues.
pub const TOKEN_SCHEME: &str = "opaquelocktoken:";

/// An opaque lock token, stored as the full state-token URI
/// (`opaquelocktoken:<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockToken(String);

impl LockToken {
    /// Generate a fresh, globally unique token.
    pub fn generate() -> Self {
        Self(format!("{}{}", TOKEN_SCHEME, Uuid::new_v4()))
    }

    /// Parse a token as supplied by a client.
    ///
    /// Accepts the canonical `<opaquelocktoken:...>` form as well as the
    /// unbracketed form some clients send in `Lock-Token`. Both normalize to
    /// the same value.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let inner = trimmed.strip_prefix('<').unwrap_or(trimmed);
        let inner = inner.strip_suffix('>').unwrap_or(inner).trim();

        if inner.is_empty() {
            return Err(DavLockError::BadRequest("empty lock token".to_string()));
        }
        if inner
            .chars()
            .any(|c| c.is_whitespace() || c == '<' || c == '>')
        {
            return Err(DavLockError::BadRequest(format!(
                "malformed lock token '{}'",
                trimmed
            )));
        }

        Ok(Self(inner.to_string()))
    }

    /// The token URI without angle brackets.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token in coded-URL form, as sent in the `Lock-Token` response header.
    pub fn bracketed(&self) -> String {
        format!("<{}>", self.0)
    }
}

impl std::fmt::Display for LockToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
