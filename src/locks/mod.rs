//! Lock table for davlock.
//!
//! # Lock Records
//!
//! Each [`LockInfo`] holds:
//! - `token`: `opaquelocktoken:<uuid>`, unique for the lifetime of the table
//! - `path`: the normalized lock root
//! - `scope`: exclusive or shared
//! - `depth`: zero (root only) or infinite (root and descendants)
//! - `owner`: client-supplied value, echoed verbatim
//! - `timeout` / `created`: lifetime, checked lazily on every read
//!
//! # Backends
//!
//! Storage is behind the [`LockStore`] trait. [`MemoryLockStore`] keeps the
//! table in memory; [`FileLockStore`] persists it as JSON with atomic
//! replacement. [`LockResolver`] layers the hierarchy walk on top of either.

mod file;
mod memory;
mod resolver;
mod store;
mod token;
mod types;


pub use file::FileLockStore;
pub use memory::MemoryLockStore;
pub use resolver::LockResolver;
pub use store::{LockStore, TableGuard};
pub use token::{LockToken, TOKEN_SCHEME};
pub use types::{LockDepth, LockInfo, LockScope, LockTimeout};
