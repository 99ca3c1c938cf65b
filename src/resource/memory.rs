//! In-memory resource tree.

use super::ResourceTree;
use crate::error::{DavLockError, Result};
use crate::paths;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Collection,
    File(Vec<u8>),
}

/// A resource tree held in memory. The root collection always exists.
#[derive(Debug)]
pub struct MemoryTree {
    nodes: RwLock<BTreeMap<String, Node>>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Collection);
        Self {
            nodes: RwLock::new(nodes),
        }
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `content` to a file, creating it if needed. Returns whether it was created.
    pub fn put_file(&self, path: &str, content: &[u8]) -> Result<bool> {
        let path = paths::normalize(path);
        let mut nodes = self.nodes.write();
        require_parent(&nodes, &path)?;

        match nodes.get(&path) {
            Some(Node::Collection) => Err(DavLockError::Conflict(format!(
                "'{}' is a collection",
                path
            ))),
            existing => {
                let created = existing.is_none();
                nodes.insert(path, Node::File(content.to_vec()));
                Ok(created)
            }
        }
    }

    /// Create a collection.
    pub fn make_collection(&self, path: &str) -> Result<()> {
        let path = paths::normalize(path);
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&path) {
            return Err(DavLockError::MethodNotAllowed(format!(
                "'{}' already exists",
                path
            )));
        }
        require_parent(&nodes, &path)?;
        nodes.insert(path, Node::Collection);
        Ok(())
    }

    /// Remove a resource and everything beneath it.
    pub fn remove(&self, path: &str) -> Result<()> {
        let path = paths::normalize(path);
        let mut nodes = self.nodes.write();
        if !nodes.contains_key(&path) {
            return Err(DavLockError::NotFound(path));
        }
        nodes.retain(|p, _| !paths::is_within(p, &path));
        nodes.insert("/".to_string(), Node::Collection);
        Ok(())
    }

    /// Copy a resource (and its subtree) to `dest`, replacing whatever was there.
    /// Returns whether `dest` was created.
    pub fn copy(&self, source: &str, dest: &str) -> Result<bool> {
        let source = paths::normalize(source);
        let dest = paths::normalize(dest);
        let mut nodes = self.nodes.write();
        copy_subtree(&mut nodes, &source, &dest)
    }

    /// Move a resource (and its subtree) to `dest`. Returns whether `dest` was created.
    pub fn rename(&self, source: &str, dest: &str) -> Result<bool> {
        let source = paths::normalize(source);
        let dest = paths::normalize(dest);
        let mut nodes = self.nodes.write();
        let created = copy_subtree(&mut nodes, &source, &dest)?;
        nodes.retain(|p, _| !paths::is_within(p, &source) || paths::is_within(p, &dest));
        Ok(created)
    }

    /// Content of a file, `None` for collections and missing paths.
    pub fn content(&self, path: &str) -> Option<Vec<u8>> {
        match self.nodes.read().get(&paths::normalize(path)) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }
}

fn require_parent(nodes: &BTreeMap<String, Node>, path: &str) -> Result<()> {
    let Some(parent) = paths::parent(path) else {
        return Err(DavLockError::Conflict("the root cannot be replaced".to_string()));
    };
    match nodes.get(&parent) {
        Some(Node::Collection) => Ok(()),
        _ => Err(DavLockError::Conflict(format!(
            "parent collection '{}' does not exist",
            parent
        ))),
    }
}

fn copy_subtree(nodes: &mut BTreeMap<String, Node>, source: &str, dest: &str) -> Result<bool> {
    if !nodes.contains_key(source) {
        return Err(DavLockError::NotFound(source.to_string()));
    }
    if paths::is_within(dest, source) {
        return Err(DavLockError::Conflict(format!(
            "cannot copy '{}' into itself",
            source
        )));
    }
    require_parent(nodes, dest)?;

    let copied: Vec<(String, Node)> = nodes
        .iter()
        .filter(|(p, _)| paths::is_within(p, source))
        .map(|(p, node)| (format!("{}{}", dest, &p[source.len()..]), node.clone()))
        .map(|(p, node)| (paths::normalize(&p), node))
        .collect();

    let created = !nodes.contains_key(dest);
    nodes.retain(|p, _| !paths::is_within(p, dest));
    nodes.extend(copied);
    Ok(created)
}

impl ResourceTree for MemoryTree {
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.nodes.read().contains_key(path))
    }

    fn is_collection(&self, path: &str) -> Result<bool> {
        Ok(matches!(self.nodes.read().get(path), Some(Node::Collection)))
    }

    fn etag(&self, path: &str) -> Result<Option<String>> {
        Ok(match self.nodes.read().get(path) {
            Some(Node::File(content)) => {
                let mut hasher = DefaultHasher::new();
                content.hash(&mut hasher);
                Some(format!("\"{:016x}\"", hasher.finish()))
            }
            _ => None,
        })
    }

    fn create_empty(&self, path: &str) -> Result<()> {
        self.put_file(path, b"").map(|_| ())
    }
}
