//! Error types for the davlock engine.
//!
//! Uses thiserror for derive macros. Every variant maps to exactly one HTTP
//! status code and one CLI exit code.

use crate::exit_codes;
use http::StatusCode;
use thiserror::Error;

/// Main error type for lock engine operations.
///
/// All failures are terminal for the current request: nothing is retried and
/// no partial side effects are left behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DavLockError {
    /// Malformed `Timeout`/`If`/`Lock-Token` header, or malformed lock body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request is well-formed but conflicts with current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The If header was parsed but evaluated to false.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A covering lock exists and its token was not submitted.
    #[error("resource is locked (lock root: {lock_root})")]
    Locked {
        /// Root path of the first lock that blocked the request.
        lock_root: String,
    },

    /// The method is not available (locking disabled, no lock store).
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Lock store or resource tree failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DavLockError {
    /// Build a `Locked` error for the given lock root.
    pub fn locked(lock_root: impl Into<String>) -> Self {
        DavLockError::Locked {
            lock_root: lock_root.into(),
        }
    }

    /// Returns the HTTP status code reported to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DavLockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DavLockError::Conflict(_) => StatusCode::CONFLICT,
            DavLockError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            DavLockError::Locked { .. } => StatusCode::LOCKED,
            DavLockError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DavLockError::NotFound(_) => StatusCode::NOT_FOUND,
            DavLockError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DavLockError::BadRequest(_) => exit_codes::BAD_REQUEST,
            DavLockError::PreconditionFailed(_) => exit_codes::PRECONDITION_FAILED,
            DavLockError::Conflict(_) | DavLockError::NotFound(_) => exit_codes::CONFLICT,
            DavLockError::Locked { .. } => exit_codes::LOCKED,
            DavLockError::MethodNotAllowed(_) | DavLockError::Storage(_) => {
                exit_codes::STORAGE_FAILURE
            }
        }
    }

    /// RFC 4918 precondition element describing this error, if any.
    pub fn precondition(&self) -> Option<&'static str> {
        match self {
            DavLockError::Locked { .. } => Some("lock-token-submitted"),
            _ => None,
        }
    }
}

/// Result type alias for davlock operations.
pub type Result<T> = std::result::Result<T, DavLockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let err = DavLockError::BadRequest("invalid Timeout header".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.exit_code(), exit_codes::BAD_REQUEST);
    }

    #[test]
    fn conflict_maps_to_409() {
        let err = DavLockError::Conflict("no such lock".to_string());
        assert_eq!(err.status_code().as_u16(), 409);
        assert_eq!(err.exit_code(), exit_codes::CONFLICT);
    }

    #[test]
    fn precondition_failed_maps_to_412() {
        let err = DavLockError::PreconditionFailed("etag mismatch".to_string());
        assert_eq!(err.status_code().as_u16(), 412);
        assert_eq!(err.exit_code(), exit_codes::PRECONDITION_FAILED);
    }

    #[test]
    fn locked_maps_to_423() {
        let err = DavLockError::locked("/dir");
        assert_eq!(err.status_code().as_u16(), 423);
        assert_eq!(err.exit_code(), exit_codes::LOCKED);
        assert_eq!(err.precondition(), Some("lock-token-submitted"));
    }

    #[test]
    fn storage_maps_to_500() {
        let err = DavLockError::Storage("disk full".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.exit_code(), exit_codes::STORAGE_FAILURE);
        assert_eq!(err.precondition(), None);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = DavLockError::locked("/dir/child.txt");
        assert_eq!(err.to_string(), "resource is locked (lock root: /dir/child.txt)");

        let err = DavLockError::BadRequest("missing Lock-Token header".to_string());
        assert_eq!(err.to_string(), "bad request: missing Lock-Token header");
    }
}
