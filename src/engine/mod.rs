//! The WebDAV class 2 lock engine.
//!
//! [`LockEngine`] ties the lock store, the hierarchy resolver and the If-header
//! evaluator together:
//!
//! - `LOCK` / `UNLOCK` requests are answered by [`LockEngine::handle`]
//! - every other state-changing method is vetted by [`MethodGuard::check`]
//!   before it runs, and [`MethodGuard::after_unbind`] drops the locks of
//!   resources it deleted or moved away
//!
//! Without a lock store the engine is inert: no methods or features are
//! advertised, the guard lets everything through, and LOCK/UNLOCK are
//! refused with `405 Method Not Allowed`.

mod discovery;
mod guard;
mod lock;
mod request;
mod unlock;


pub use discovery::{ActiveLock, error_body};
pub use guard::MethodGuard;
pub use request::{DavRequest, DavResponse, LockRequest};

use crate::conditions::{self, ConditionState, IfHeader};
use crate::config::Config;
use crate::error::{DavLockError, Result};
use crate::headers;
use crate::locks::{LockInfo, LockResolver, LockStore, LockToken};
use crate::paths;
use crate::resource::ResourceTree;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Lock engine over an optional lock store and a resource tree.
pub struct LockEngine {
    store: Option<Arc<dyn LockStore>>,
    tree: Arc<dyn ResourceTree>,
    config: Config,
    // Held across every check-then-write sequence on the lock table.
    write_gate: Mutex<()>,
}

impl LockEngine {
    pub fn new(
        store: Option<Arc<dyn LockStore>>,
        tree: Arc<dyn ResourceTree>,
        config: Config,
    ) -> Self {
        Self {
            store,
            tree,
            config,
            write_gate: Mutex::new(()),
        }
    }

    /// Whether a lock store is configured.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Methods this engine adds to the server's `Allow` list.
    pub fn http_methods(&self) -> Vec<&'static str> {
        if self.is_enabled() { vec!["LOCK", "UNLOCK"] } else { Vec::new() }
    }

    /// Compliance classes this engine adds to the `DAV` header.
    pub fn features(&self) -> Vec<&'static str> {
        if self.is_enabled() { vec!["2"] } else { Vec::new() }
    }

    /// Unexpired locks covering `path`, plus those below it when `include_children` is set.
    ///
    /// Always empty without a lock store.
    pub fn get_locks(&self, path: &str, include_children: bool) -> Result<Vec<LockInfo>> {
        match &self.store {
            Some(store) => {
                LockResolver::new(store.as_ref()).get_locks(&paths::normalize(path), include_children)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Every unexpired lock in the table, ordered by path.
    pub fn active_locks(&self) -> Result<Vec<LockInfo>> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };
        let mut locks: Vec<LockInfo> = store
            .all_locks()?
            .into_iter()
            .filter(|l| !l.is_expired())
            .collect();
        locks.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(locks)
    }

    /// Run a LOCK or UNLOCK request, returning the success response or the error.
    pub fn execute(&self, request: &DavRequest) -> Result<DavResponse> {
        match request.method.as_str() {
            "LOCK" => self.lock(request),
            "UNLOCK" => self.unlock(request),
            other => Err(DavLockError::MethodNotAllowed(format!(
                "{} is not handled by the lock engine",
                other
            ))),
        }
    }

    /// Answer a LOCK or UNLOCK request. Failures become error responses.
    pub fn handle(&self, request: &DavRequest) -> DavResponse {
        self.execute(request).unwrap_or_else(|error| {
            warn!(
                method = %request.method,
                path = %request.path,
                status = error.status_code().as_u16(),
                %error,
                "lock request refused"
            );
            let precondition = match (&error, request.method.as_str()) {
                (DavLockError::Conflict(_), "UNLOCK") => Some("lock-token-matches-request-uri"),
                _ => error.precondition(),
            };
            error_response(&error, precondition)
        })
    }

    fn store(&self) -> Result<&dyn LockStore> {
        self.store.as_deref().ok_or_else(|| {
            DavLockError::MethodNotAllowed("locking is disabled: no lock store configured".to_string())
        })
    }

    fn if_header(&self, request: &DavRequest, path: &str) -> Result<Option<IfHeader>> {
        headers::header_str(&request.headers, &headers::IF)?
            .map(|value| conditions::parse(value, path))
            .transpose()
    }

    /// Evaluate an If header against live state; `PreconditionFailed` when it does not hold.
    fn require_conditions(&self, store: &dyn LockStore, header: &IfHeader) -> Result<()> {
        let state = LiveState {
            resolver: LockResolver::new(store),
            tree: self.tree.as_ref(),
        };
        if conditions::evaluate(header, &state)? {
            Ok(())
        } else {
            Err(DavLockError::PreconditionFailed(
                "If header conditions did not match".to_string(),
            ))
        }
    }
}

/// Live lock and entity-tag state for the If-header evaluator.
struct LiveState<'a> {
    resolver: LockResolver<'a>,
    tree: &'a dyn ResourceTree,
}

impl ConditionState for LiveState<'_> {
    fn valid_tokens(&self, path: &str) -> Result<Vec<LockToken>> {
        Ok(self
            .resolver
            .get_locks(path, false)?
            .into_iter()
            .map(|l| l.token)
            .collect())
    }

    fn current_etag(&self, path: &str) -> Result<Option<String>> {
        self.tree.etag(path)
    }
}

fn xml_response(status: StatusCode, body: String) -> DavResponse {
    let mut response = DavResponse::new(status);
    response
        .headers
        .insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
    response.body = body;
    response
}

fn error_response(error: &DavLockError, precondition: Option<&str>) -> DavResponse {
    let body = error_body(error, precondition).unwrap_or_default();
    xml_response(error.status_code(), body)
}
