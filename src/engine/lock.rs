//! LOCK: creation and refresh.

use super::discovery::ActiveLock;
use super::request::{DavRequest, DavResponse, LockRequest};
use super::{LockEngine, xml_response};
use crate::conditions::IfHeader;
use crate::error::{DavLockError, Result};
use crate::headers;
use crate::locks::{LockDepth, LockInfo, LockResolver, LockStore, LockTimeout};
use crate::paths;
use http::{HeaderValue, StatusCode};
use tracing::{info, warn};

impl LockEngine {
    pub(super) fn lock(&self, request: &DavRequest) -> Result<DavResponse> {
        let store = self.store()?;
        let path = paths::normalize(&request.path);
        let requested = headers::timeout_from(&request.headers)?;
        let if_header = self.if_header(request, &path)?;

        match &request.lock_body {
            Some(body) => self.create_lock(store, request, &path, body, requested, if_header.as_ref()),
            None => self.refresh_lock(store, &path, requested, if_header.as_ref()),
        }
    }

    fn create_lock(
        &self,
        store: &dyn LockStore,
        request: &DavRequest,
        path: &str,
        body: &LockRequest,
        requested: Option<LockTimeout>,
        if_header: Option<&IfHeader>,
    ) -> Result<DavResponse> {
        let scope = body.validate()?;
        let depth = headers::lock_depth_from(&request.headers)?;
        let timeout = self.config.granted_timeout(requested);

        let _gate = self.write_gate.lock();
        let _table = store.lock_table()?;

        let existing = LockResolver::new(store).get_locks(path, depth == LockDepth::Infinite)?;
        for lock in existing.iter().filter(|l| !scope.is_compatible_with(l.scope)) {
            // A second lock rooted at the same resource can never be proven away.
            let proven = lock.path != path && if_header.is_some_and(|h| h.submits(&lock.token));
            if !proven {
                warn!(path, lock_root = %lock.path, "conflicting lock");
                return Err(DavLockError::locked(&lock.path));
            }
        }

        if let Some(header) = if_header {
            self.require_conditions(store, header)?;
        }

        let created = !self.tree.exists(path)?;
        let lock = LockInfo::new(path, scope, depth, body.owner.clone(), timeout);
        store.put(lock.clone())?;
        // Roll the lock back if the placeholder cannot be created.
        if created && let Err(error) = self.tree.create_empty(path) {
            store.delete(path, &lock.token)?;
            return Err(error);
        }
        info!(
            path,
            token = %lock.token,
            scope = scope.as_str(),
            depth = depth.as_str(),
            timeout = %timeout,
            created,
            "lock granted"
        );

        let status = if created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        lock_response(status, &lock)
    }

    fn refresh_lock(
        &self,
        store: &dyn LockStore,
        path: &str,
        requested: Option<LockTimeout>,
        if_header: Option<&IfHeader>,
    ) -> Result<DavResponse> {
        let Some(header) = if_header else {
            let covering = LockResolver::new(store).get_locks(path, false)?;
            return Err(match covering.first() {
                Some(lock) => DavLockError::locked(&lock.path),
                None => DavLockError::BadRequest(
                    "LOCK without a body refreshes a lock and needs an If header".to_string(),
                ),
            });
        };

        let _gate = self.write_gate.lock();
        let _table = store.lock_table()?;

        let mut lock = store
            .locks_for_path(path)?
            .into_iter()
            .filter(|l| !l.is_expired())
            .find(|l| header.submits(&l.token))
            .ok_or_else(|| {
                DavLockError::PreconditionFailed(format!(
                    "no lock rooted at '{}' matches the submitted tokens",
                    path
                ))
            })?;
        self.require_conditions(store, header)?;

        let timeout = match requested {
            Some(_) => self.config.granted_timeout(requested),
            None => lock.timeout,
        };
        lock.refresh(timeout);
        store.put(lock.clone())?;
        info!(path, token = %lock.token, timeout = %timeout, "lock refreshed");

        lock_response(StatusCode::OK, &lock)
    }
}

fn lock_response(status: StatusCode, lock: &LockInfo) -> Result<DavResponse> {
    let body = ActiveLock::from_lock(lock).to_xml()?;
    let mut response = xml_response(status, body);
    let token = HeaderValue::from_str(&lock.token.bracketed()).map_err(|_| {
        DavLockError::Storage(format!("lock token '{}' is not valid header text", lock.token))
    })?;
    response.headers.insert(headers::LOCK_TOKEN, token);
    Ok(response)
}
