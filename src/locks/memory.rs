//! Ephemeral in-memory lock store.

use super::store::LockStore;
use super::token::LockToken;
use super::types::LockInfo;
use crate::error::Result;
use crate::paths;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Lock table held in process memory.
///
/// A `BTreeMap` keeps iteration ordered by path, so descendant queries and
/// listings are deterministic.
#[derive(Debug, Default)]
pub struct MemoryLockStore {
    locks: RwLock<BTreeMap<String, Vec<LockInfo>>>,
}

impl MemoryLockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockStore for MemoryLockStore {
    fn locks_for_path(&self, path: &str) -> Result<Vec<LockInfo>> {
        Ok(self.locks.read().get(path).cloned().unwrap_or_default())
    }

    fn locks_below(&self, path: &str) -> Result<Vec<LockInfo>> {
        let table = self.locks.read();
        Ok(table
            .iter()
            .filter(|(root, _)| paths::is_descendant(root, path))
            .flat_map(|(_, locks)| locks.iter().cloned())
            .collect())
    }

    fn put(&self, lock: LockInfo) -> Result<()> {
        let now = Utc::now();
        let mut table = self.locks.write();

        for locks in table.values_mut() {
            locks.retain(|l| l.token != lock.token);
        }

        let entry = table.entry(lock.path.clone()).or_default();
        entry.retain(|l| !l.is_expired_at(now));
        entry.push(lock);

        table.retain(|_, locks| !locks.is_empty());
        Ok(())
    }

    fn delete(&self, path: &str, token: &LockToken) -> Result<bool> {
        let mut table = self.locks.write();
        let Some(locks) = table.get_mut(path) else {
            return Ok(false);
        };

        let before = locks.len();
        locks.retain(|l| &l.token != token);
        let removed = locks.len() != before;

        if locks.is_empty() {
            table.remove(path);
        }
        Ok(removed)
    }

    fn all_locks(&self) -> Result<Vec<LockInfo>> {
        Ok(self.locks.read().values().flatten().cloned().collect())
    }
}
