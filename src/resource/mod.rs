//! The resource tree the lock engine consults.
//!
//! The engine never reads or writes content itself. It asks the tree whether
//! a path exists, what its entity tag is, and (for LOCK on an unmapped URL)
//! to create an empty placeholder.

mod local;
mod memory;


pub use local::LocalTree;
pub use memory::MemoryTree;

use crate::error::Result;

/// Resource collaborator of the lock engine. Paths are normalized request paths.
pub trait ResourceTree: Send + Sync {
    /// Whether anything is mapped at `path`.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Whether `path` is a collection.
    fn is_collection(&self, path: &str) -> Result<bool>;

    /// Quoted entity tag of a non-collection resource; `None` for collections
    /// and missing resources.
    fn etag(&self, path: &str) -> Result<Option<String>>;

    /// Create an empty non-collection resource at `path`.
    ///
    /// Fails with `Conflict` when the parent collection does not exist.
    fn create_empty(&self, path: &str) -> Result<()>;
}
