//! Resource tree backed by a local directory.

use super::ResourceTree;
use crate::error::{DavLockError, Result};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Maps normalized request paths onto files beneath `root`.
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a normalized request path.
    pub fn local_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn metadata(&self, path: &str) -> Result<Option<fs::Metadata>> {
        let local = self.local_path(path);
        match fs::metadata(&local) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DavLockError::Storage(format!(
                "failed to stat '{}': {}",
                local.display(),
                e
            ))),
        }
    }
}

impl ResourceTree for LocalTree {
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.metadata(path)?.is_some())
    }

    fn is_collection(&self, path: &str) -> Result<bool> {
        Ok(self.metadata(path)?.is_some_and(|m| m.is_dir()))
    }

    fn etag(&self, path: &str) -> Result<Option<String>> {
        let Some(meta) = self.metadata(path)? else {
            return Ok(None);
        };
        if meta.is_dir() {
            return Ok(None);
        }

        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        Ok(Some(format!("\"{:x}-{:x}\"", meta.len(), mtime)))
    }

    fn create_empty(&self, path: &str) -> Result<()> {
        let local = self.local_path(path);
        let parent_is_dir = local.parent().is_some_and(|p| p.is_dir());
        if !parent_is_dir {
            return Err(DavLockError::Conflict(format!(
                "parent collection of '{}' does not exist",
                path
            )));
        }

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&local)
            .map(|_| ())
            .map_err(|e| {
                DavLockError::Storage(format!("failed to create '{}': {}", local.display(), e))
            })
    }
}
