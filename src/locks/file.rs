//! JSON file-backed lock store.
//!
//! The whole table lives in a single JSON document (default
//! `.davlock/locks.json`):
//!
//! ```json
//! { "locks": [ { "token": "opaquelocktoken:...", "path": "/dir", ... } ] }
//! ```
//!
//! Every mutation is a read-modify-write of that document, persisted with an
//! atomic rename. Writers exclude each other, across processes too, through a
//! sidecar guard file (`locks.json.lock`) created with `create_new`; the engine
//! holds it over its whole check-then-write sequence via
//! [`LockStore::lock_table`]. A guard older than [`STALE_AFTER`] is assumed to
//! be left over from a crashed process and is removed.

use super::store::{LockStore, TableGuard};
use super::token::LockToken;
use super::types::LockInfo;
use crate::error::{DavLockError, Result};
use crate::fs::atomic_write;
use crate::paths;
use chrono::Utc;
use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a writer waits for another holder of the table.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Age after which a sidecar guard is considered abandoned.
pub const STALE_AFTER: Duration = Duration::from_secs(30);

const RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// On-disk layout of the lock table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LockTable {
    #[serde(default)]
    locks: Vec<LockInfo>,
}

/// Lock store persisted to a JSON file.
#[derive(Debug)]
pub struct FileLockStore {
    path: PathBuf,
    guard_path: PathBuf,
    // Nesting depth of `lock_table` on the thread holding it.
    held: ReentrantMutex<Cell<usize>>,
}

impl FileLockStore {
    /// Open (lazily) the lock table at `path`. The file is created on first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut guard_name = path.file_name().unwrap_or_default().to_os_string();
        guard_name.push(".lock");
        Self {
            guard_path: path.with_file_name(guard_name),
            path,
            held: ReentrantMutex::new(Cell::new(0)),
        }
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sidecar guard file.
    pub fn guard_path(&self) -> &Path {
        &self.guard_path
    }

    fn acquire_guard_file(&self) -> Result<()> {
        if let Some(parent) = self.guard_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                DavLockError::Storage(format!(
                    "failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let started = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.guard_path)
            {
                Ok(mut file) => {
                    // Holder pid, for operators looking at a stuck table.
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if self.guard_file_is_stale() {
                        warn!(path = %self.guard_path.display(), "removing stale lock table guard");
                        let _ = fs::remove_file(&self.guard_path);
                        continue;
                    }
                    if started.elapsed() >= BUSY_TIMEOUT {
                        return Err(DavLockError::Storage(format!(
                            "lock table '{}' is busy: '{}' is held by another process",
                            self.path.display(),
                            self.guard_path.display()
                        )));
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => {
                    return Err(DavLockError::Storage(format!(
                        "failed to acquire '{}': {}",
                        self.guard_path.display(),
                        e
                    )));
                }
            }
        }
    }

    fn guard_file_is_stale(&self) -> bool {
        fs::metadata(&self.guard_path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age > STALE_AFTER)
    }

    fn release_guard_file(&self) {
        if let Err(e) = fs::remove_file(&self.guard_path) {
            warn!(
                path = %self.guard_path.display(),
                error = %e,
                "failed to release lock table guard"
            );
        }
    }

    fn load(&self) -> Result<LockTable> {
        if !self.path.exists() {
            return Ok(LockTable::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            DavLockError::Storage(format!(
                "failed to read lock table '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(LockTable::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            DavLockError::Storage(format!(
                "failed to parse lock table '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn save(&self, table: &LockTable) -> Result<()> {
        let json = serde_json::to_string_pretty(table).map_err(|e| {
            DavLockError::Storage(format!("failed to serialize lock table: {}", e))
        })?;
        atomic_write(&self.path, json.as_bytes())
    }
}

impl LockStore for FileLockStore {
    fn locks_for_path(&self, path: &str) -> Result<Vec<LockInfo>> {
        Ok(self
            .load()?
            .locks
            .into_iter()
            .filter(|l| l.path == path)
            .collect())
    }

    fn locks_below(&self, path: &str) -> Result<Vec<LockInfo>> {
        let mut locks: Vec<LockInfo> = self
            .load()?
            .locks
            .into_iter()
            .filter(|l| paths::is_descendant(&l.path, path))
            .collect();
        locks.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(locks)
    }

    fn put(&self, lock: LockInfo) -> Result<()> {
        let _table = self.lock_table()?;
        let mut table = self.load()?;

        table.locks.retain(|l| l.token != lock.token);

        let now = Utc::now();
        let before = table.locks.len();
        table.locks.retain(|l| !l.is_expired_at(now));
        let reaped = before - table.locks.len();
        if reaped > 0 {
            debug!(reaped, "dropped expired lock records");
        }

        table.locks.push(lock);
        self.save(&table)
    }

    fn delete(&self, path: &str, token: &LockToken) -> Result<bool> {
        let _table = self.lock_table()?;
        let mut table = self.load()?;

        let before = table.locks.len();
        table
            .locks
            .retain(|l| !(l.path == path && &l.token == token));

        if table.locks.len() == before {
            return Ok(false);
        }
        self.save(&table)?;
        Ok(true)
    }

    fn all_locks(&self) -> Result<Vec<LockInfo>> {
        let mut locks = self.load()?.locks;
        locks.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(locks)
    }

    fn lock_table(&self) -> Result<TableGuard<'_>> {
        let held = self.held.lock();
        if held.get() == 0 {
            self.acquire_guard_file()?;
        }
        held.set(held.get() + 1);

        Ok(TableGuard::new(move || {
            held.set(held.get() - 1);
            if held.get() == 0 {
                self.release_guard_file();
            }
        }))
    }
}
