//! UNLOCK.

use super::LockEngine;
use super::request::{DavRequest, DavResponse};
use crate::error::{DavLockError, Result};
use crate::headers;
use crate::paths;
use http::StatusCode;
use tracing::info;

impl LockEngine {
    /// Remove the lock named by `Lock-Token`. Only a lock rooted exactly at the
    /// request path is removed; anything else, an expired lock included, is a
    /// conflict.
    pub(super) fn unlock(&self, request: &DavRequest) -> Result<DavResponse> {
        let store = self.store()?;
        let path = paths::normalize(&request.path);
        let token = headers::lock_token_from(&request.headers)?;

        let _gate = self.write_gate.lock();
        let _table = store.lock_table()?;

        // Expired records are absent, even before the store reaps them.
        let live = store
            .locks_for_path(&path)?
            .iter()
            .any(|l| l.token == token && !l.is_expired());
        if !live || !store.delete(&path, &token)? {
            return Err(DavLockError::Conflict(format!(
                "no lock with token '{}' is rooted at '{}'",
                token, path
            )));
        }

        info!(path = %path, token = %token, "lock released");
        Ok(DavResponse::new(StatusCode::NO_CONTENT))
    }
}
