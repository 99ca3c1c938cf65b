//! The lock store contract.

use super::token::LockToken;
use super::types::LockInfo;
use crate::error::Result;

/// Backend holding the lock table, keyed by normalized path.
///
/// Stores return records exactly as written, expired ones included; expiry
/// is applied by the resolver on every read. Implementations may reap expired
/// records while handling a write.
pub trait LockStore: Send + Sync {
    /// Locks rooted exactly at `path`. No hierarchy walk.
    fn locks_for_path(&self, path: &str) -> Result<Vec<LockInfo>>;

    /// Locks rooted strictly beneath `path`.
    fn locks_below(&self, path: &str) -> Result<Vec<LockInfo>>;

    /// Insert a lock, replacing any record with the same token.
    fn put(&self, lock: LockInfo) -> Result<()>;

    /// Remove the lock with `token` rooted at `path`. Returns whether a record was removed.
    fn delete(&self, path: &str, token: &LockToken) -> Result<bool>;

    /// Every record in the table, for inspection.
    fn all_locks(&self) -> Result<Vec<LockInfo>>;

    /// Hold the table exclusively until the returned guard drops.
    ///
    /// Reads and writes made through this store by the holder stay inside the
    /// critical section, so a check-then-write sequence cannot interleave with
    /// another writer. Backends shared between processes must exclude those
    /// processes too. Purely in-process stores may rely on the caller's own
    /// serialization and return [`TableGuard::unlocked`].
    fn lock_table(&self) -> Result<TableGuard<'_>> {
        Ok(TableGuard::unlocked())
    }
}

/// Critical section over a lock table, released on drop.
#[must_use = "the table is released as soon as the guard is dropped"]
pub struct TableGuard<'a> {
    release: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a> TableGuard<'a> {
    /// Guard that runs `release` when dropped.
    pub fn new(release: impl FnOnce() + 'a) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard with nothing to release.
    pub fn unlocked() -> Self {
        Self { release: None }
    }
}

impl Drop for TableGuard<'_> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}
