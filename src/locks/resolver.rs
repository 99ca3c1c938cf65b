//! Hierarchy-aware lock lookup.

use super::store::LockStore;
use super::types::{LockDepth, LockInfo};
use crate::error::Result;
use crate::paths;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

/// Finds every lock that applies to a path.
///
/// Result order is stable: inherited locks from the root downwards, then
/// locks rooted at the path itself, then (optionally) locks on descendants
/// ordered by path. Expired locks are skipped without touching the store.
pub struct LockResolver<'a> {
    store: &'a dyn LockStore,
}

impl<'a> LockResolver<'a> {
    /// Create a resolver over `store`.
    pub fn new(store: &'a dyn LockStore) -> Self {
        Self { store }
    }

    /// Locks covering `path`, plus locks below it when `include_children` is set.
    pub fn get_locks(&self, path: &str, include_children: bool) -> Result<Vec<LockInfo>> {
        self.get_locks_at(path, include_children, Utc::now())
    }

    /// Same as [`get_locks`](Self::get_locks) with an explicit clock.
    pub fn get_locks_at(
        &self,
        path: &str,
        include_children: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<LockInfo>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut push = |lock: LockInfo, result: &mut Vec<LockInfo>| {
            if !lock.is_expired_at(now) && seen.insert(lock.token.clone()) {
                result.push(lock);
            }
        };

        let mut ancestors = paths::ancestors(path);
        ancestors.reverse();
        for ancestor in &ancestors {
            for lock in self.store.locks_for_path(ancestor)? {
                if lock.depth == LockDepth::Infinite {
                    push(lock, &mut result);
                }
            }
        }

        for lock in self.store.locks_for_path(path)? {
            push(lock, &mut result);
        }

        if include_children {
            let mut below = self.store.locks_below(path)?;
            below.sort_by(|a, b| a.path.cmp(&b.path));
            for lock in below {
                push(lock, &mut result);
            }
        }

        debug!(
            path,
            include_children,
            found = result.len(),
            "resolved applicable locks"
        );
        Ok(result)
    }
}
