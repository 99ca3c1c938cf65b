//! Served-root and state-directory resolution for davlock.
//!
//! Every command works against a served root directory (default: the current
//! working directory). Lock engine state lives beneath it:
//!
//! ```text
//! {root}/.davlock/config.yaml   optional configuration
//! {root}/.davlock/locks.json    lock table (file backend)
//! ```

use crate::config::{Config, LockBackend};
use crate::engine::LockEngine;
use crate::error::{DavLockError, Result};
use crate::locks::{FileLockStore, LockStore, MemoryLockStore};
use crate::resource::{LocalTree, ResourceTree};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// State directory name within the served root.
pub const STATE_DIR: &str = ".davlock";

/// Config file name within the state directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Resolved paths for a served root. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ServerContext {
    /// Directory whose contents are served (request path `/`).
    pub root: PathBuf,

    /// `{root}/.davlock/`.
    pub state_dir: PathBuf,
}

impl ServerContext {
    /// Resolve the context for `root`, or for the current working directory.
    ///
    /// # Returns
    ///
    /// * `Ok(ServerContext)` - Successfully resolved context
    /// * `Err(DavLockError::NotFound)` - The root is missing or not a directory
    pub fn resolve(root: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => env::current_dir().map_err(|e| {
                DavLockError::Storage(format!("failed to get current working directory: {}", e))
            })?,
        };
        Self::resolve_from(root)
    }

    /// Resolve the context for a specific directory.
    pub fn resolve_from<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(DavLockError::NotFound(format!(
                "served root '{}' is not a directory",
                root.display()
            )));
        }

        let root = root.canonicalize().map_err(|e| {
            DavLockError::Storage(format!("failed to resolve '{}': {}", root.display(), e))
        })?;
        let state_dir = root.join(STATE_DIR);

        Ok(Self { root, state_dir })
    }

    /// Get the path to config.yaml.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    /// Get the path to the JSON lock table for `config`.
    pub fn lock_db_path(&self, config: &Config) -> PathBuf {
        self.state_dir.join(&config.lock_db)
    }

    /// Load config.yaml, falling back to defaults when it does not exist.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    /// Build a lock engine serving this root with the configured backend.
    pub fn engine(&self, config: &Config) -> Result<LockEngine> {
        config.validate()?;

        let store: Option<Arc<dyn LockStore>> = match config.lock_backend {
            LockBackend::None => None,
            LockBackend::Memory => Some(Arc::new(MemoryLockStore::new())),
            LockBackend::File => Some(Arc::new(FileLockStore::new(self.lock_db_path(config)))),
        };
        debug!(
            root = %self.root.display(),
            backend = config.lock_backend.as_str(),
            "lock engine configured"
        );

        let tree: Arc<dyn ResourceTree> = Arc::new(LocalTree::new(&self.root));
        Ok(LockEngine::new(store, tree, config.clone()))
    }
}
