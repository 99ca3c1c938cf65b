//! Atomic file replacement for the lock table.
//!
//! 1. Write the new table to `.{filename}.tmp` next to the target
//! 2. fsync the temporary file
//! 3. Rename it over the target
//!
//! `rename()` replaces the destination atomically on POSIX when both paths
//! share a filesystem; the temporary file always lives in the target's
//! directory so that holds. On crash a stale `.tmp` file may remain; it is
//! overwritten by the next write.

use crate::error::{DavLockError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically replace `path` with `content`, creating parent directories.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
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

    let temp_path = temp_path_for(path)?;
    write_and_sync(&temp_path, content)?;
    replace(&temp_path, path)
}

fn temp_path_for(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DavLockError::Storage(format!("invalid lock table path '{}'", target.display()))
        })?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        DavLockError::Storage(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            DavLockError::Storage(format!(
                "failed to write temporary file '{}': {}",
                path.display(),
                e
            ))
        })
}

fn replace(source: &Path, target: &Path) -> Result<()> {
    #[cfg(windows)]
    if target.exists() {
        // rename() refuses to overwrite on Windows.
        let _ = fs::remove_file(target);
    }

    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        DavLockError::Storage(format!(
            "failed to replace '{}': {}",
            target.display(),
            e
        ))
    })?;

    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locks.json");

        atomic_write(&path, b"{\"locks\":[]}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"locks\":[]}");
    }

    #[test]
    fn replaces_existing_file_without_leaving_temp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locks.json");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_dir.path().join(".locks.json.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".davlock").join("locks.json");

        atomic_write(&path, b"[]").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path_for(Path::new("/srv/.davlock/locks.json")).unwrap();
        assert_eq!(temp, Path::new("/srv/.davlock/.locks.json.tmp"));
    }
}
