//! A miniature WebDAV pipeline for exercising the lock engine end to end.
//!
//! `TestServer::send` runs the guard, performs the method on a `MemoryTree`,
//! then releases the locks of anything that was unbound, the same sequence a
//! real server follows.

use crate::config::Config;
use crate::engine::{DavRequest, DavResponse, LockEngine, LockRequest, MethodGuard};
use crate::error::{DavLockError, Result};
use crate::headers;
use crate::locks::{LockStore, MemoryLockStore};
use crate::paths;
use crate::resource::{MemoryTree, ResourceTree};
use http::{HeaderName, Method, StatusCode};
use std::sync::Arc;

pub(crate) struct TestServer {
    pub(crate) tree: Arc<MemoryTree>,
    pub(crate) store: Arc<MemoryLockStore>,
    pub(crate) engine: LockEngine,
}

impl TestServer {
    /// `/test.txt`, `/dir` and `/dir/child.txt`, with an in-memory lock store.
    pub(crate) fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub(crate) fn with_config(config: Config) -> Self {
        let tree = Arc::new(fixture_tree());
        let store = Arc::new(MemoryLockStore::new());
        let engine = LockEngine::new(
            Some(store.clone() as Arc<dyn LockStore>),
            tree.clone() as Arc<dyn ResourceTree>,
            config,
        );
        Self {
            tree,
            store,
            engine,
        }
    }

    /// Same tree, locking disabled.
    pub(crate) fn without_store() -> Self {
        let tree = Arc::new(fixture_tree());
        let engine = LockEngine::new(
            None,
            tree.clone() as Arc<dyn ResourceTree>,
            Config::default(),
        );
        Self {
            tree,
            store: Arc::new(MemoryLockStore::new()),
            engine,
        }
    }

    /// LOCK `path` with `body`, returning the full response.
    pub(crate) fn lock(
        &self,
        path: &str,
        body: Option<LockRequest>,
        extra: &[(&str, &str)],
    ) -> DavResponse {
        let mut req = request("LOCK", path, extra);
        req.lock_body = body;
        self.engine.handle(&req)
    }

    /// Take an exclusive lock and return its bracketed token.
    pub(crate) fn lock_token(&self, path: &str) -> String {
        let response = self.lock(path, Some(LockRequest::exclusive(None)), &[]);
        assert!(
            response.status.is_success(),
            "LOCK {} failed with {}",
            path,
            response.status
        );
        response
            .header_str("lock-token")
            .expect("LOCK response carries a Lock-Token header")
            .to_string()
    }

    pub(crate) fn send(&self, req: &DavRequest) -> StatusCode {
        if matches!(req.method.as_str(), "LOCK" | "UNLOCK") {
            return self.engine.handle(req).status;
        }
        match self.engine.check(req).and_then(|_| self.perform(req)) {
            Ok(status) => status,
            Err(e) => e.status_code(),
        }
    }

    fn perform(&self, req: &DavRequest) -> Result<StatusCode> {
        let path = paths::normalize(&req.path);
        match req.method.as_str() {
            "GET" => {
                if self.tree.exists(&path)? {
                    Ok(StatusCode::OK)
                } else {
                    Err(DavLockError::NotFound(path))
                }
            }
            "PUT" => {
                let created = self.tree.put_file(&path, b"Updated contents")?;
                Ok(created_or_no_content(created))
            }
            "MKCOL" => {
                self.tree.make_collection(&path)?;
                Ok(StatusCode::CREATED)
            }
            "PROPPATCH" => {
                if self.tree.exists(&path)? {
                    Ok(StatusCode::MULTI_STATUS)
                } else {
                    Err(DavLockError::NotFound(path))
                }
            }
            "DELETE" => {
                self.tree.remove(&path)?;
                self.engine.after_unbind(&path)?;
                Ok(StatusCode::NO_CONTENT)
            }
            "COPY" | "MOVE" => {
                let destination = destination(req)?;
                let existed = self.tree.exists(&destination)?;
                if existed && !headers::overwrite_from(&req.headers)? {
                    return Err(DavLockError::PreconditionFailed(format!(
                        "'{}' exists and Overwrite is F",
                        destination
                    )));
                }

                let created = if req.method.as_str() == "COPY" {
                    self.tree.copy(&path, &destination)?
                } else {
                    let created = self.tree.rename(&path, &destination)?;
                    self.engine.after_unbind(&path)?;
                    created
                };
                if existed {
                    self.engine.after_unbind(&destination)?;
                }
                Ok(created_or_no_content(created))
            }
            other => Err(DavLockError::MethodNotAllowed(other.to_string())),
        }
    }
}

fn created_or_no_content(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    }
}

fn destination(req: &DavRequest) -> Result<String> {
    headers::header_str(&req.headers, &headers::DESTINATION)?
        .map(paths::normalize)
        .ok_or_else(|| DavLockError::BadRequest("missing Destination header".to_string()))
}

fn fixture_tree() -> MemoryTree {
    let tree = MemoryTree::new();
    tree.put_file("/test.txt", b"Test contents").unwrap();
    tree.make_collection("/dir").unwrap();
    tree.put_file("/dir/child.txt", b"Child contents").unwrap();
    tree
}

/// Build a request with the given headers.
pub(crate) fn request(method: &str, path: &str, headers: &[(&str, &str)]) -> DavRequest {
    let method = Method::from_bytes(method.as_bytes()).unwrap();
    headers
        .iter()
        .fold(DavRequest::new(method, path), |req, (name, value)| {
            req.header(HeaderName::from_bytes(name.as_bytes()).unwrap(), value)
                .unwrap()
        })
}
