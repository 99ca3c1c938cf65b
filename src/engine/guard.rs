//! Pre-flight lock checks for state-changing methods.
//!
//! | Method                  | Locks that must be proven                        |
//! |-------------------------|--------------------------------------------------|
//! | PUT, MKCOL, PROPPATCH   | locks covering the path                          |
//! | DELETE                  | locks covering the path or anything beneath it   |
//! | COPY                    | locks covering the destination (and, when it is  |
//! |                         | overwritten, anything beneath it)                |
//! | MOVE                    | DELETE rule on the source plus the COPY rule     |
//!
//! A lock is proven when its token appears, not negated, in the `If` header.
//! The `If` header itself, when present, must also evaluate to true.

use super::LockEngine;
use super::request::DavRequest;
use crate::error::{DavLockError, Result};
use crate::headers;
use crate::locks::{LockInfo, LockResolver, LockStore};
use crate::paths;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Lock enforcement around the methods the engine does not serve itself.
pub trait MethodGuard {
    /// Decide whether `request` may proceed.
    ///
    /// Fails with `Locked` when a lock the method must respect was not proven,
    /// and with `PreconditionFailed` when the `If` header does not hold.
    fn check(&self, request: &DavRequest) -> Result<()>;

    /// Drop every lock rooted at or beneath `path` once the resource there has
    /// been deleted, moved away or overwritten.
    fn after_unbind(&self, path: &str) -> Result<()>;
}

impl MethodGuard for LockEngine {
    fn check(&self, request: &DavRequest) -> Result<()> {
        let Some(store) = self.store.as_deref() else {
            return Ok(());
        };

        let path = paths::normalize(&request.path);
        let if_header = self.if_header(request, &path)?;

        for lock in self.must_locks(store, request, &path)? {
            let proven = if_header.as_ref().is_some_and(|h| h.submits(&lock.token));
            if !proven {
                warn!(
                    method = %request.method,
                    path = %path,
                    lock_root = %lock.path,
                    "request blocked by lock"
                );
                return Err(DavLockError::locked(lock.path));
            }
        }

        if let Some(header) = &if_header {
            self.require_conditions(store, header)?;
        }

        debug!(method = %request.method, path = %path, "lock check passed");
        Ok(())
    }

    fn after_unbind(&self, path: &str) -> Result<()> {
        let Some(store) = self.store.as_deref() else {
            return Ok(());
        };
        let path = paths::normalize(path);

        let _gate = self.write_gate.lock();
        let _table = store.lock_table()?;
        let mut doomed = store.locks_for_path(&path)?;
        doomed.extend(store.locks_below(&path)?);

        for lock in &doomed {
            store.delete(&lock.path, &lock.token)?;
        }
        if !doomed.is_empty() {
            info!(path = %path, released = doomed.len(), "released locks of unbound resource");
        }
        Ok(())
    }
}

impl LockEngine {
    fn must_locks(
        &self,
        store: &dyn LockStore,
        request: &DavRequest,
        path: &str,
    ) -> Result<Vec<LockInfo>> {
        let resolver = LockResolver::new(store);
        match request.method.as_str() {
            "PUT" | "MKCOL" | "PROPPATCH" => resolver.get_locks(path, false),
            "DELETE" => resolver.get_locks(path, true),
            "COPY" => self.destination_locks(&resolver, request),
            "MOVE" => {
                let mut locks = resolver.get_locks(path, true)?;
                let mut seen: HashSet<_> = locks.iter().map(|l| l.token.clone()).collect();
                for lock in self.destination_locks(&resolver, request)? {
                    if seen.insert(lock.token.clone()) {
                        locks.push(lock);
                    }
                }
                Ok(locks)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn destination_locks(
        &self,
        resolver: &LockResolver<'_>,
        request: &DavRequest,
    ) -> Result<Vec<LockInfo>> {
        let destination = headers::header_str(&request.headers, &headers::DESTINATION)?
            .ok_or_else(|| {
                DavLockError::BadRequest(format!("{} requires a Destination header", request.method))
            })?;
        let destination = paths::normalize(destination);

        let overwrites = headers::overwrite_from(&request.headers)? && self.tree.exists(&destination)?;
        resolver.get_locks(&destination, overwrites)
    }
}
